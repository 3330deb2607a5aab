//! Data Transfer Objects - request/response types for the API.
//!
//! Request fields are `Option` so the handlers can answer a missing field
//! with the exact `... is required` message instead of a generic
//! deserialization error. Query parameters arrive as raw strings and are
//! parsed leniently or strictly per field by the handlers.

use serde::{Deserialize, Serialize};

use quad_core::domain::{Comment, Post};

/// Request to create a school.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSchoolRequest {
    pub name: Option<String>,
}

/// Request to create a user in a school.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub school_id: Option<i64>,
}

/// Request to create a post. The author is identified by `userId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub user_id: Option<i64>,
    pub content: Option<String>,
    pub media_url: Option<String>,
}

/// Request to create a comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub user_id: Option<i64>,
    pub post_id: Option<i64>,
    pub content: Option<String>,
    pub media_url: Option<String>,
}

/// Query parameters for the feed endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub user_id: Option<String>,
    pub limit: Option<String>,
    pub cursor: Option<String>,
}

/// Query parameters for the post detail endpoint (comment pagination).
#[derive(Debug, Clone, Deserialize)]
pub struct PostDetailQuery {
    pub limit: Option<String>,
    pub cursor: Option<String>,
}

/// Feed page envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub posts: Vec<Post>,
    /// `createdAt` of the last post on this page; null when empty.
    pub next_cursor: Option<String>,
    pub has_more: bool,
    /// Ready-made URL for the next page, set only when there is a cursor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preload_hint: Option<String>,
}

/// A post merged with one page of its comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
    pub comments_next_cursor: Option<String>,
    pub comments_has_more: bool,
}
