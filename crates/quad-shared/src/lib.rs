//! # Quad Shared
//!
//! Request and response types for the HTTP API, shared between the server
//! and any Rust client.

pub mod dto;
pub mod response;

pub use response::ErrorBody;
