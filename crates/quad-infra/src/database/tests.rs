#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use quad_core::ports::{PostRepository, SchoolRepository};

    use crate::database::entity::{post, school};
    use crate::database::postgres::{PostgresPostRepository, PostgresSchoolRepository};

    fn post_model(id: i64, school_id: i64, created_at: i64) -> post::Model {
        post::Model {
            id,
            user_id: 1,
            school_id,
            content: "Content".to_owned(),
            media_url: None,
            created_at,
            upvotes: 0,
            downvotes: 0,
            comments_count: 0,
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(7, 3, 1_000)]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result = repo.find_by_id(7).await.unwrap();

        assert!(result.is_some());
        let post = result.unwrap();
        assert_eq!(post.id, 7);
        assert_eq!(post.school_id, 3);
        assert_eq!(post.created_at, 1_000);
    }

    #[tokio::test]
    async fn test_create_school_maps_returned_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![school::Model {
                id: 1,
                name: "Fern U".to_owned(),
            }]])
            .into_connection();

        let repo = PostgresSchoolRepository::new(db);

        let created = repo.create("Fern U").await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.name, "Fern U");
    }

    #[tokio::test]
    async fn test_page_by_school_maps_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![
                post_model(5, 3, 4_000),
                post_model(4, 3, 3_000),
            ]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let rows = repo.page_by_school(3, Some(5_000), 2).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![5, 4]);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_a_row_went_away() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        assert!(repo.delete(9).await.unwrap());
        assert!(!repo.delete(9).await.unwrap());
    }

    #[tokio::test]
    async fn test_counter_update_tolerates_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        repo.increment_comments(404).await.unwrap();
    }

    #[tokio::test]
    async fn test_reconcile_reports_repaired_row_count() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        assert_eq!(repo.reconcile_comment_counts().await.unwrap(), 3);
    }
}
