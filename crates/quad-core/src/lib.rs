//! # Quad Core
//!
//! The domain layer of the Quad campus feed backend.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the error taxonomy, the port traits infrastructure must implement,
//! and the feed algorithms (cursor pagination and trending ranking).

pub mod domain;
pub mod error;
pub mod feed;
pub mod ports;

pub use error::{DomainError, RepoError};
