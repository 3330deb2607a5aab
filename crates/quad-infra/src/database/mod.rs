//! Content store implementations.
//!
//! `postgres` holds the SeaORM repositories used in production; `memory`
//! is a full in-process store used when `DATABASE_URL` is absent and by
//! the test suites. Both implement the repository ports from quad-core,
//! including the cascade delete and the missing-row no-op semantics the
//! counter maintainer relies on.

mod connections;
mod memory;
mod postgres;

pub mod entity;

pub use connections::{DatabaseConfig, connect};
pub use memory::MemoryStore;
pub use postgres::{
    PostgresCommentRepository, PostgresPostRepository, PostgresSchoolRepository,
    PostgresUserRepository,
};

#[cfg(test)]
mod tests;
