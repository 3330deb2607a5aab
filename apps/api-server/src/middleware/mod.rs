//! Middleware modules.

pub mod error;
pub mod rate_limit;

pub use error::{ApiError, ApiResult, json_error_handler, query_error_handler};
pub use rate_limit::RateLimitGuard;
