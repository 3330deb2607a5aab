//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, Statement,
};

use quad_core::domain::{Comment, NewComment, NewPost, Post, School, User};
use quad_core::error::RepoError;
use quad_core::ports::{CommentRepository, PostRepository, SchoolRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::school::{self, Entity as SchoolEntity};
use super::entity::user::{self, Entity as UserEntity};

/// Maps constraint failures onto the repository error taxonomy.
fn classify(e: DbErr) -> RepoError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => RepoError::UniqueViolation(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => RepoError::ForeignKeyViolation(msg),
        _ => RepoError::Query(e.to_string()),
    }
}

/// PostgreSQL school repository.
pub struct PostgresSchoolRepository {
    db: DbConn,
}

impl PostgresSchoolRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SchoolRepository for PostgresSchoolRepository {
    async fn create(&self, name: &str) -> Result<School, RepoError> {
        let model = school::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(classify)?;

        tracing::debug!(school_id = model.id, "School created");
        Ok(model.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<School>, RepoError> {
        let result = SchoolEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

/// PostgreSQL user repository.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, name: &str, school_id: i64, created_at: i64) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            name: Set(name.to_string()),
            school_id: Set(school_id),
            created_at: Set(created_at),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(classify)?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, draft: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(draft)
            .insert(&self.db)
            .await
            .map_err(classify)?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn page_by_school(
        &self,
        school_id: i64,
        before: Option<i64>,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let mut query = PostEntity::find().filter(post::Column::SchoolId.eq(school_id));

        if let Some(before) = before {
            query = query.filter(post::Column::CreatedAt.lt(before));
        }

        let rows = query
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn recent_by_school(&self, school_id: i64, since: i64) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::SchoolId.eq(school_id))
            .filter(post::Column::CreatedAt.gte(since))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn increment_comments(&self, post_id: i64) -> Result<(), RepoError> {
        PostEntity::update_many()
            .col_expr(
                post::Column::CommentsCount,
                Expr::col(post::Column::CommentsCount).add(1),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(())
    }

    async fn decrement_comments(&self, post_id: i64) -> Result<(), RepoError> {
        PostEntity::update_many()
            .col_expr(
                post::Column::CommentsCount,
                Expr::col(post::Column::CommentsCount).sub(1),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(())
    }

    async fn reconcile_comment_counts(&self) -> Result<u64, RepoError> {
        // One pass: rewrite any counter that disagrees with the live
        // comment rows. Touches only drifted posts.
        let stmt = Statement::from_string(
            self.db.get_database_backend(),
            r#"UPDATE posts
               SET comments_count = (
                   SELECT COUNT(*) FROM comments WHERE comments.post_id = posts.id
               )
               WHERE comments_count <> (
                   SELECT COUNT(*) FROM comments WHERE comments.post_id = posts.id
               )"#,
        );

        let result = self
            .db
            .execute(stmt)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

/// PostgreSQL comment repository.
pub struct PostgresCommentRepository {
    db: DbConn,
}

impl PostgresCommentRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, draft: NewComment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel::from(draft)
            .insert(&self.db)
            .await
            .map_err(classify)?;

        Ok(model.into())
    }

    async fn page_by_post(
        &self,
        post_id: i64,
        before: Option<i64>,
        limit: u64,
    ) -> Result<Vec<Comment>, RepoError> {
        let mut query = CommentEntity::find().filter(comment::Column::PostId.eq(post_id));

        if let Some(before) = before {
            query = query.filter(comment::Column::CreatedAt.lt(before));
        }

        let rows = query
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let result = CommentEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}
