//! Content moderation stack.
//!
//! `classifier` talks to an OpenAI-style chat-completions endpoint,
//! `denylist` is the local fallback for when that endpoint refuses a
//! prompt, and `pipeline` is the worker pool that resolves verdicts
//! after content has already been returned to its author.

mod classifier;
mod denylist;
mod pipeline;

pub use classifier::{ChatClassifier, ClassifierConfig};
pub use denylist::DenyList;
pub use pipeline::{
    ModerationPipeline, ModerationPipelineConfig, ModerationStats, ModerationTask,
};
