//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures, mapped to HTTP statuses by the server.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or missing user input (400).
    #[error("{0}")]
    Validation(String),

    /// A referenced entity does not exist (404).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unique-constraint violation, e.g. a duplicate school name (409).
    #[error("{0}")]
    Conflict(String),

    /// Foreign-key violation, e.g. an unknown schoolId (400).
    #[error("{0}")]
    Integrity(String),

    /// Unexpected store failure (500).
    #[error("{0}")]
    Internal(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),
}
