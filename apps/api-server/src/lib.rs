//! # Quad API Server
//!
//! The Actix-web HTTP surface for the campus feed: schools, users, posts,
//! comments, the two feed views, plus the ambient pieces (state wiring,
//! rate limiting, the moderation pipeline, the reconciliation sweep).
//!
//! The server logic lives in this library so the HTTP tests can mount
//! the same routes over an in-process store; `main.rs` is a thin binary.

pub mod background;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod telemetry;
