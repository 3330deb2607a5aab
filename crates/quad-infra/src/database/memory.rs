//! In-memory content store - used when no database is configured.
//!
//! Backs local development and the test suites. Mirrors the Postgres
//! semantics the rest of the system depends on: sequential ids starting
//! at 1, unique school names, foreign key checks, comment cascade on
//! post delete, and counter updates that no-op when the post is gone.
//! Note: Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quad_core::domain::{Comment, NewComment, NewPost, Post, School, User};
use quad_core::error::RepoError;
use quad_core::ports::{CommentRepository, PostRepository, SchoolRepository, UserRepository};

#[derive(Default)]
struct StoreState {
    schools: HashMap<i64, School>,
    users: HashMap<i64, User>,
    posts: HashMap<i64, Post>,
    comments: HashMap<i64, Comment>,
    school_seq: i64,
    user_seq: i64,
    post_seq: i64,
    comment_seq: i64,
}

/// In-memory store implementing every repository port. Cloning shares
/// the underlying state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T: Clone>(
    rows: impl Iterator<Item = T>,
    before: Option<i64>,
    limit: u64,
    created_at: impl Fn(&T) -> i64,
    id: impl Fn(&T) -> i64,
) -> Vec<T> {
    let mut matching: Vec<T> = rows
        .filter(|row| match before {
            Some(bound) => created_at(row) < bound,
            None => true,
        })
        .collect();

    matching.sort_by(|a, b| {
        created_at(b)
            .cmp(&created_at(a))
            .then_with(|| id(b).cmp(&id(a)))
    });
    matching.truncate(limit as usize);
    matching
}

#[async_trait]
impl SchoolRepository for MemoryStore {
    async fn create(&self, name: &str) -> Result<School, RepoError> {
        let mut state = self.state.write().await;

        if state.schools.values().any(|s| s.name == name) {
            return Err(RepoError::UniqueViolation("schools.name".to_string()));
        }

        state.school_seq += 1;
        let school = School {
            id: state.school_seq,
            name: name.to_string(),
        };
        state.schools.insert(school.id, school.clone());

        Ok(school)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<School>, RepoError> {
        let state = self.state.read().await;
        Ok(state.schools.get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, name: &str, school_id: i64, created_at: i64) -> Result<User, RepoError> {
        let mut state = self.state.write().await;

        if !state.schools.contains_key(&school_id) {
            return Err(RepoError::ForeignKeyViolation("users.school_id".to_string()));
        }

        state.user_seq += 1;
        let user = User {
            id: state.user_seq,
            name: name.to_string(),
            school_id,
            created_at,
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, draft: NewPost) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&draft.user_id) {
            return Err(RepoError::ForeignKeyViolation("posts.user_id".to_string()));
        }
        if !state.schools.contains_key(&draft.school_id) {
            return Err(RepoError::ForeignKeyViolation("posts.school_id".to_string()));
        }

        state.post_seq += 1;
        let post = Post {
            id: state.post_seq,
            user_id: draft.user_id,
            school_id: draft.school_id,
            content: draft.content,
            media_url: draft.media_url,
            created_at: draft.created_at,
            upvotes: 0,
            downvotes: 0,
            comments_count: 0,
        };
        state.posts.insert(post.id, post.clone());

        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.get(&id).cloned())
    }

    async fn page_by_school(
        &self,
        school_id: i64,
        before: Option<i64>,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;
        let rows = state
            .posts
            .values()
            .filter(|p| p.school_id == school_id)
            .cloned();

        Ok(page(rows, before, limit, |p| p.created_at, |p| p.id))
    }

    async fn recent_by_school(&self, school_id: i64, since: i64) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;
        let rows = state
            .posts
            .values()
            .filter(|p| p.school_id == school_id && p.created_at >= since)
            .cloned();

        Ok(page(rows, None, u64::MAX, |p| p.created_at, |p| p.id))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;

        if state.posts.remove(&id).is_none() {
            return Ok(false);
        }
        state.comments.retain(|_, c| c.post_id != id);

        Ok(true)
    }

    async fn increment_comments(&self, post_id: i64) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        if let Some(post) = state.posts.get_mut(&post_id) {
            post.comments_count += 1;
        }
        Ok(())
    }

    async fn decrement_comments(&self, post_id: i64) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        if let Some(post) = state.posts.get_mut(&post_id) {
            post.comments_count -= 1;
        }
        Ok(())
    }

    async fn reconcile_comment_counts(&self) -> Result<u64, RepoError> {
        let mut state = self.state.write().await;

        let mut live: HashMap<i64, i64> = HashMap::new();
        for comment in state.comments.values() {
            *live.entry(comment.post_id).or_insert(0) += 1;
        }

        let mut repaired = 0;
        for post in state.posts.values_mut() {
            let count = live.get(&post.id).copied().unwrap_or(0);
            if post.comments_count != count {
                post.comments_count = count;
                repaired += 1;
            }
        }

        Ok(repaired)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, draft: NewComment) -> Result<Comment, RepoError> {
        let mut state = self.state.write().await;

        if !state.posts.contains_key(&draft.post_id) {
            return Err(RepoError::ForeignKeyViolation(
                "comments.post_id".to_string(),
            ));
        }
        if !state.users.contains_key(&draft.user_id) {
            return Err(RepoError::ForeignKeyViolation(
                "comments.user_id".to_string(),
            ));
        }

        state.comment_seq += 1;
        let comment = Comment {
            id: state.comment_seq,
            post_id: draft.post_id,
            user_id: draft.user_id,
            content: draft.content,
            media_url: draft.media_url,
            created_at: draft.created_at,
            upvotes: 0,
            downvotes: 0,
        };
        state.comments.insert(comment.id, comment.clone());

        Ok(comment)
    }

    async fn page_by_post(
        &self,
        post_id: i64,
        before: Option<i64>,
        limit: u64,
    ) -> Result<Vec<Comment>, RepoError> {
        let state = self.state.read().await;
        let rows = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned();

        Ok(page(rows, before, limit, |c| c.created_at, |c| c.id))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        Ok(state.comments.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_draft(user_id: i64, school_id: i64, created_at: i64) -> NewPost {
        NewPost {
            user_id,
            school_id,
            content: "post".to_string(),
            media_url: None,
            created_at,
        }
    }

    fn comment_draft(post_id: i64, user_id: i64, created_at: i64) -> NewComment {
        NewComment {
            post_id,
            user_id,
            content: "comment".to_string(),
            media_url: None,
            created_at,
        }
    }

    async fn seeded() -> (MemoryStore, School, User) {
        let store = MemoryStore::new();
        let school = SchoolRepository::create(&store, "Fern U").await.unwrap();
        let user = UserRepository::create(&store, "nat", school.id, 1_000)
            .await
            .unwrap();
        (store, school, user)
    }

    #[tokio::test]
    async fn ids_are_sequential_from_one() {
        let store = MemoryStore::new();
        let first = SchoolRepository::create(&store, "A").await.unwrap();
        let second = SchoolRepository::create(&store, "B").await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn duplicate_school_name_is_rejected() {
        let store = MemoryStore::new();
        SchoolRepository::create(&store, "Fern U").await.unwrap();

        let err = SchoolRepository::create(&store, "Fern U")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn user_requires_existing_school() {
        let store = MemoryStore::new();

        let err = UserRepository::create(&store, "nat", 42, 1_000)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn deleting_a_post_cascades_its_comments() {
        let (store, school, user) = seeded().await;
        let post = PostRepository::create(&store, post_draft(user.id, school.id, 2_000))
            .await
            .unwrap();
        CommentRepository::create(&store, comment_draft(post.id, user.id, 2_100))
            .await
            .unwrap();

        assert!(PostRepository::delete(&store, post.id).await.unwrap());
        assert!(!PostRepository::delete(&store, post.id).await.unwrap());

        let remaining = store.page_by_post(post.id, None, 10).await.unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn counter_updates_ignore_missing_posts() {
        let store = MemoryStore::new();

        store.increment_comments(99).await.unwrap();
        store.decrement_comments(99).await.unwrap();
    }

    #[tokio::test]
    async fn reconcile_repairs_drifted_counters() {
        let (store, school, user) = seeded().await;
        let post = PostRepository::create(&store, post_draft(user.id, school.id, 2_000))
            .await
            .unwrap();
        CommentRepository::create(&store, comment_draft(post.id, user.id, 2_100))
            .await
            .unwrap();
        store.increment_comments(post.id).await.unwrap();

        // Two stray decrements drive the counter negative.
        store.decrement_comments(post.id).await.unwrap();
        store.decrement_comments(post.id).await.unwrap();
        let drifted = PostRepository::find_by_id(&store, post.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(drifted.comments_count, -1);

        let repaired = store.reconcile_comment_counts().await.unwrap();
        assert_eq!(repaired, 1);

        let fixed = PostRepository::find_by_id(&store, post.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fixed.comments_count, 1);
    }

    #[tokio::test]
    async fn pages_are_newest_first_with_id_tiebreak() {
        let (store, school, user) = seeded().await;
        for created_at in [1_000, 3_000, 2_000, 3_000] {
            PostRepository::create(&store, post_draft(user.id, school.id, created_at))
                .await
                .unwrap();
        }

        let rows = store.page_by_school(school.id, None, 10).await.unwrap();
        let order: Vec<(i64, i64)> = rows.iter().map(|p| (p.created_at, p.id)).collect();

        // Equal timestamps fall back to the higher id first.
        assert_eq!(order, vec![(3_000, 4), (3_000, 2), (2_000, 3), (1_000, 1)]);

        let bounded = store
            .page_by_school(school.id, Some(3_000), 10)
            .await
            .unwrap();
        let ids: Vec<i64> = bounded.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
