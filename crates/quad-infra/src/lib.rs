//! # Quad Infrastructure
//!
//! Concrete implementations of the ports defined in `quad-core`:
//! SeaORM/Postgres repositories with an in-memory fallback store, the
//! Redis and in-process rate limiters, and the content moderation
//! stack (classifier client, deny-list fallback, worker pipeline).

pub mod database;
pub mod moderation;
pub mod rate_limit;

pub use database::{DatabaseConfig, MemoryStore};
pub use moderation::{ChatClassifier, DenyList, ModerationPipeline};
pub use rate_limit::{InMemoryRateLimiter, RedisRateLimiter};
