//! Redis rate limiter using a clock-aligned fixed window.
//!
//! Every request INCRs `{prefix}:{key}:{window_start}` where
//! `window_start` is the current time floored to the window length, so
//! all server instances sharing the Redis agree on the same counter.
//! The key expires after one window; the reset moment reported to
//! clients is the start of the next window.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Script};

use quad_core::ports::{RateLimitDecision, RateLimitError, RateLimiter};

/// Redis rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RedisRateLimitConfig {
    /// Redis URL (e.g. redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Maximum requests per window
    pub max_requests: u32,
    /// Window duration
    pub window: Duration,
    /// Key prefix for rate limit keys
    pub key_prefix: String,
}

impl Default for RedisRateLimitConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            max_requests: 20,
            window: Duration::from_secs(60),
            key_prefix: "rate_limit:user".to_string(),
        }
    }
}

impl RedisRateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_requests),
            window: Duration::from_secs(
                std::env::var("RATE_LIMIT_WINDOW_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            key_prefix: std::env::var("RATE_LIMIT_KEY_PREFIX").unwrap_or(defaults.key_prefix),
        }
    }
}

/// Start of the window containing `now_secs`, and the moment it resets.
fn window_bounds(now_secs: i64, window_secs: i64) -> (i64, i64) {
    let start = (now_secs / window_secs) * window_secs;
    (start, start + window_secs)
}

/// Redis-backed fixed-window rate limiter.
pub struct RedisRateLimiter {
    conn: ConnectionManager,
    config: RedisRateLimitConfig,
    /// Lua script for atomic increment with expiry
    script: Script,
}

impl RedisRateLimiter {
    pub async fn new(config: RedisRateLimitConfig) -> Result<Self, RateLimitError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn_manager_fut = ConnectionManager::new(client);
        let conn = tokio::time::timeout(config.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| RateLimitError::Backend("Connection timed out".to_string()))?
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        // First writer of a window key also sets its TTL
        let script = Script::new(
            r#"
            local current = redis.call('INCR', KEYS[1])
            if current == 1 then
                redis.call('EXPIRE', KEYS[1], ARGV[1])
            end
            return current
            "#,
        );

        tracing::info!(url = %config.url, "Connected to Redis rate limiter");

        Ok(Self {
            conn,
            config,
            script,
        })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, RateLimitError> {
        Self::new(RedisRateLimitConfig::from_env()).await
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitDecision, RateLimitError> {
        let now_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| RateLimitError::Backend(e.to_string()))?
            .as_secs() as i64;
        let window_secs = self.config.window.as_secs() as i64;
        let (window_start, resets_at) = window_bounds(now_secs, window_secs.max(1));

        let redis_key = format!("{}:{}:{}", self.config.key_prefix, key, window_start);
        let mut conn = self.conn.clone();

        let current: i64 = self
            .script
            .key(&redis_key)
            .arg(window_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        let limit = self.config.max_requests;
        let allowed = current <= i64::from(limit);
        let remaining = (i64::from(limit) - current).max(0) as u32;

        Ok(RateLimitDecision {
            allowed,
            limit,
            remaining,
            resets_at,
        })
    }
}
