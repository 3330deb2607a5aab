//! Background maintenance tasks.

mod scheduler;

pub use scheduler::{ReconcileConfig, ReconcileScheduler};
