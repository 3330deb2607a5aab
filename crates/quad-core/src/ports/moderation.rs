//! Content moderation port.
//!
//! Implementations wrap an external classifier (or a local fallback)
//! and return a [`Verdict`] for a piece of user content. The pipeline
//! that consumes this port is fail-open: any error other than
//! [`ClassifyError::PromptRejected`] leaves content visible.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// A classifier's decision about one piece of content.
///
/// This is also the wire shape the remote classifier is instructed to
/// answer with, so it derives `Deserialize` directly.
#[derive(Debug, Clone, Deserialize)]
pub struct Verdict {
    pub flagged: bool,
    #[serde(default)]
    pub category: Option<String>,
}

impl Verdict {
    pub fn clean() -> Self {
        Self {
            flagged: false,
            category: None,
        }
    }

    pub fn flagged_for(category: impl Into<String>) -> Self {
        Self {
            flagged: true,
            category: Some(category.into()),
        }
    }
}

/// Classifier trait - abstraction over moderation backends.
#[async_trait]
pub trait VerdictProvider: Send + Sync {
    async fn classify(&self, content: &str) -> Result<Verdict, ClassifyError>;
}

/// Classification errors.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// No credentials were provided at startup.
    #[error("classifier is not configured")]
    Unconfigured,

    #[error("classifier request timed out")]
    Timeout,

    #[error("classifier transport error: {0}")]
    Transport(String),

    #[error("classifier returned status {0}")]
    Status(u16),

    /// The classifier refused the prompt itself (e.g. a content filter
    /// upstream of the model). Callers fall back to a local check.
    #[error("classifier rejected the prompt: {0}")]
    PromptRejected(String),

    #[error("unparseable classifier response: {0}")]
    InvalidResponse(String),
}
