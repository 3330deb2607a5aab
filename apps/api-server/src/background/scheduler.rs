//! Comment-count reconciliation sweep, driven by tokio-cron-scheduler.
//!
//! The denormalized counter on posts is maintained by best-effort
//! increments and decrements; this sweep is what makes the drift
//! temporary. It runs a repair pass on a cron schedule and logs how many
//! rows it touched.

use std::sync::Arc;

use quad_core::ports::PostRepository;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

const DEFAULT_SCHEDULE: &str = "0 */5 * * * *";

/// Reconciliation sweep configuration.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Enable the sweep.
    pub enabled: bool,
    /// Six-field cron expression, seconds first.
    pub schedule: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: DEFAULT_SCHEDULE.to_string(),
        }
    }
}

impl ReconcileConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("RECONCILE_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            schedule: std::env::var("RECONCILE_SCHEDULE")
                .unwrap_or_else(|_| DEFAULT_SCHEDULE.to_string()),
        }
    }
}

/// Owns the cron scheduler behind the sweep.
pub struct ReconcileScheduler {
    inner: JobScheduler,
}

impl ReconcileScheduler {
    /// Start the sweep. Returns `None` when disabled or when scheduling
    /// fails; the server keeps serving either way, the counters just
    /// stop self-correcting.
    pub async fn start(config: &ReconcileConfig, posts: Arc<dyn PostRepository>) -> Option<Self> {
        if !config.enabled {
            tracing::info!("Comment count reconciliation disabled");
            return None;
        }

        match Self::schedule(config, posts).await {
            Ok(scheduler) => Some(scheduler),
            Err(err) => {
                tracing::error!(error = %err, "Failed to start the reconciliation scheduler");
                None
            }
        }
    }

    async fn schedule(
        config: &ReconcileConfig,
        posts: Arc<dyn PostRepository>,
    ) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;

        let job = Job::new_async(config.schedule.as_str(), move |_uuid, _lock| {
            let posts = Arc::clone(&posts);
            Box::pin(async move {
                match posts.reconcile_comment_counts().await {
                    Ok(0) => tracing::debug!("Comment counts already consistent"),
                    Ok(repaired) => {
                        tracing::info!(repaired, "Repaired drifted comment counts")
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "Comment count reconciliation failed")
                    }
                }
            })
        })?;

        let id = inner.add(job).await?;
        inner.start().await?;
        tracing::info!(schedule = %config.schedule, job_id = %id, "Reconciliation sweep scheduled");

        Ok(Self { inner })
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Reconciliation scheduler stopped");
        Ok(())
    }
}
