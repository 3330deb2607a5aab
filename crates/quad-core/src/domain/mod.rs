//! Domain entities - the core business objects.
//!
//! Ids are assigned by the content store (auto-increment, starting at 1).
//! Timestamps are milliseconds since the Unix epoch; the pagination cursor
//! and the trending formula both consume this representation directly.

mod comment;
mod post;
mod school;
mod user;

pub use comment::{Comment, NewComment};
pub use post::{NewPost, Post};
pub use school::School;
pub use user::User;

use crate::error::DomainError;

/// Maximum accepted length of post/comment content, in characters.
pub const MAX_CONTENT_CHARS: usize = 300;

/// Validate the text content of a post or comment.
///
/// Rejected content never reaches the store: this runs before any row is
/// written.
pub fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.is_empty() {
        return Err(DomainError::Validation(
            "content must be a non-empty string".to_string(),
        ));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(DomainError::Validation(format!(
            "content must be {} characters or less",
            MAX_CONTENT_CHARS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_at_limit_is_accepted() {
        let content = "a".repeat(MAX_CONTENT_CHARS);
        assert!(validate_content(&content).is_ok());
    }

    #[test]
    fn content_over_limit_is_rejected() {
        let content = "a".repeat(MAX_CONTENT_CHARS + 1);
        assert!(matches!(
            validate_content(&content),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn empty_content_is_rejected() {
        assert!(matches!(
            validate_content(""),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        // 300 multi-byte characters are still 300 characters.
        let content = "é".repeat(MAX_CONTENT_CHARS);
        assert!(validate_content(&content).is_ok());
    }
}
