//! SeaORM entity definitions for the four content tables.

pub mod comment;
pub mod post;
pub mod school;
pub mod user;
