use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Comment entity - a reply attached to a post.
///
/// Deleting a comment decrements its parent's `comments_count` by exactly
/// one, unless the comment vanished as a cascade of deleting the post itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    pub media_url: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub upvotes: i64,
    pub downvotes: i64,
}

/// A comment draft; the store assigns the id on insert.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    pub media_url: Option<String>,
    pub created_at: i64,
}

impl NewComment {
    /// Create a comment draft stamped with the current time.
    pub fn new(post_id: i64, user_id: i64, content: String, media_url: Option<String>) -> Self {
        Self {
            post_id,
            user_id,
            content,
            media_url,
            created_at: Utc::now().timestamp_millis(),
        }
    }
}
