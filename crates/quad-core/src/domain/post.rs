use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Post entity - a short text/media item on a school's timeline.
///
/// `comments_count` is a denormalized cache of the number of live comments.
/// It may be transiently stale while counter updates and moderation are in
/// flight, but converges to the true count once those settle. It is the only
/// field mutated after creation besides the vote counters, which have no
/// mutator in this surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub school_id: i64,
    pub content: String,
    pub media_url: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub upvotes: i64,
    pub downvotes: i64,
    pub comments_count: i64,
}

/// A post draft; the store assigns the id on insert.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub school_id: i64,
    pub content: String,
    pub media_url: Option<String>,
    pub created_at: i64,
}

impl NewPost {
    /// Create a post draft stamped with the current time.
    pub fn new(user_id: i64, school_id: i64, content: String, media_url: Option<String>) -> Self {
        Self {
            user_id,
            school_id,
            content,
            media_url,
            created_at: Utc::now().timestamp_millis(),
        }
    }
}
