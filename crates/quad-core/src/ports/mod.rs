//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod moderation;
mod rate_limit;
mod repository;

pub use moderation::{ClassifyError, Verdict, VerdictProvider};
pub use rate_limit::{RateLimitDecision, RateLimitError, RateLimiter};
pub use repository::{CommentRepository, PostRepository, SchoolRepository, UserRepository};
