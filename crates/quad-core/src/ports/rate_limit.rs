//! Rate limiting port.

use async_trait::async_trait;

/// Rate limiter trait - abstraction over rate limiting backends.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count a request against `key` and decide whether it may proceed.
    async fn check(&self, key: &str) -> Result<RateLimitDecision, RateLimitError>;
}

/// Outcome of a rate limit check, carried into the response headers.
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Maximum requests per window.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Unix seconds at which the current window resets.
    pub resets_at: i64,
}

/// Rate limit errors.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Backend error: {0}")]
    Backend(String),
}
