//! In-memory rate limiter using the governor crate.
//!
//! Per-key GCRA with a burst equal to the window ceiling. This is the
//! fallback when Redis is not configured; limits are per-process, not
//! shared across instances, and the reset times reported to clients are
//! approximations of the fixed-window behavior of the Redis backend.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::middleware::StateInformationMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as GovernorRateLimiter};

use quad_core::ports::{RateLimitDecision, RateLimitError, RateLimiter};

type KeyedLimiter =
    GovernorRateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock, StateInformationMiddleware>;

/// In-memory rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window: Duration::from_secs(60),
        }
    }
}

/// Keyed in-memory rate limiter.
pub struct InMemoryRateLimiter {
    limiter: Arc<KeyedLimiter>,
    config: RateLimitConfig,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let quota = Quota::with_period(config.window / config.max_requests)
            .expect("Valid quota")
            .allow_burst(NonZeroU32::new(config.max_requests).expect("Non-zero"));

        let limiter = Arc::new(
            GovernorRateLimiter::keyed(quota).with_middleware::<StateInformationMiddleware>(),
        );

        Self { limiter, config }
    }

    pub fn from_env() -> Self {
        let config = RateLimitConfig {
            max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            window: Duration::from_secs(
                std::env::var("RATE_LIMIT_WINDOW_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        };
        Self::new(config)
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitDecision, RateLimitError> {
        let now_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| RateLimitError::Backend(e.to_string()))?
            .as_secs() as i64;
        let limit = self.config.max_requests;

        match self.limiter.check_key(&key.to_string()) {
            Ok(snapshot) => Ok(RateLimitDecision {
                allowed: true,
                limit,
                remaining: snapshot.remaining_burst_capacity(),
                resets_at: now_unix + self.config.window.as_secs() as i64,
            }),
            Err(not_until) => {
                let wait = not_until.wait_time_from(DefaultClock::default().now());

                Ok(RateLimitDecision {
                    allowed: false,
                    limit,
                    remaining: 0,
                    resets_at: now_unix + (wait.as_secs() as i64).max(1),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tight_limiter() -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 2,
            window: Duration::from_secs(60),
        })
    }

    #[tokio::test]
    async fn enforces_the_ceiling_per_key() {
        let limiter = tight_limiter();

        let first = limiter.check("user_1").await.unwrap();
        assert!(first.allowed);
        assert_eq!(first.limit, 2);
        assert_eq!(first.remaining, 1);

        let second = limiter.check("user_1").await.unwrap();
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        let third = limiter.check("user_1").await.unwrap();
        assert!(!third.allowed);
        assert!(third.resets_at > 0);
    }

    #[tokio::test]
    async fn keys_do_not_share_budgets() {
        let limiter = tight_limiter();

        limiter.check("user_1").await.unwrap();
        limiter.check("user_1").await.unwrap();
        assert!(!limiter.check("user_1").await.unwrap().allowed);

        assert!(limiter.check("user_2").await.unwrap().allowed);
    }
}
