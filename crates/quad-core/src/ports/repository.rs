//! Repository ports for the four persistent entities.
//!
//! All timestamps are epoch milliseconds and all pagination is cursor
//! based: a page request carries an optional exclusive upper bound on
//! `created_at` and rows come back newest first.

use async_trait::async_trait;

use crate::domain::{Comment, NewComment, NewPost, Post, School, User};
use crate::error::RepoError;

#[async_trait]
pub trait SchoolRepository: Send + Sync {
    /// Inserts a school. Names are unique; a duplicate surfaces as
    /// [`RepoError::UniqueViolation`].
    async fn create(&self, name: &str) -> Result<School, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<School>, RepoError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, name: &str, school_id: i64, created_at: i64) -> Result<User, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, draft: NewPost) -> Result<Post, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError>;

    /// Up to `limit` posts in the school with `created_at` strictly below
    /// `before` (unbounded when `None`), newest first. Rows sharing a
    /// `created_at` are ordered by descending id so pages are stable.
    async fn page_by_school(
        &self,
        school_id: i64,
        before: Option<i64>,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;

    /// Every post in the school with `created_at >= since`, newest first.
    /// Feeds the trending ranker, which re-orders in memory.
    async fn recent_by_school(&self, school_id: i64, since: i64) -> Result<Vec<Post>, RepoError>;

    /// Deletes the post (comments cascade). Returns whether a row was
    /// actually removed, so callers can make retraction idempotent.
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;

    /// Bumps the denormalized comment counter. A missing post is a no-op.
    async fn increment_comments(&self, post_id: i64) -> Result<(), RepoError>;

    /// Lowers the denormalized comment counter. A missing post is a
    /// no-op; the count is not floored at zero, drift is repaired by
    /// [`PostRepository::reconcile_comment_counts`].
    async fn decrement_comments(&self, post_id: i64) -> Result<(), RepoError>;

    /// Recomputes every `comments_count` from the live comment rows.
    /// Returns the number of posts whose counter was corrected.
    async fn reconcile_comment_counts(&self) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, draft: NewComment) -> Result<Comment, RepoError>;

    /// Up to `limit` comments on the post with `created_at` strictly
    /// below `before`, newest first, ties broken by descending id.
    async fn page_by_post(
        &self,
        post_id: i64,
        before: Option<i64>,
        limit: u64,
    ) -> Result<Vec<Comment>, RepoError>;

    /// Deletes the comment. Returns whether a row was actually removed.
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
}
