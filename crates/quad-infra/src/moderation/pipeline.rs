use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use quad_core::ports::{ClassifyError, CommentRepository, PostRepository, VerdictProvider};
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;

use super::DenyList;

const DEFAULT_WORKERS: usize = 2;
const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// A unit of content waiting for a verdict.
#[derive(Debug, Clone)]
pub enum ModerationTask {
    Post {
        post_id: i64,
        content: String,
    },
    Comment {
        comment_id: i64,
        post_id: i64,
        content: String,
    },
}

impl ModerationTask {
    fn content(&self) -> &str {
        match self {
            ModerationTask::Post { content, .. } | ModerationTask::Comment { content, .. } => {
                content
            }
        }
    }

    fn content_id(&self) -> i64 {
        match self {
            ModerationTask::Post { post_id, .. } => *post_id,
            ModerationTask::Comment { comment_id, .. } => *comment_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModerationPipelineConfig {
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Default for ModerationPipelineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ModerationPipelineConfig {
    pub fn from_env() -> Self {
        let workers = std::env::var("MODERATION_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_WORKERS);
        let queue_capacity = std::env::var("MODERATION_QUEUE_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_QUEUE_CAPACITY);
        Self {
            workers,
            queue_capacity,
        }
    }
}

/// Counter snapshot exposed on the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModerationStats {
    pub pending: usize,
    pub in_flight: usize,
    pub retained: usize,
    pub retracted: usize,
}

#[derive(Default)]
struct PipelineCounters {
    pending: AtomicUsize,
    in_flight: AtomicUsize,
    retained: AtomicUsize,
    retracted: AtomicUsize,
}

/// Asynchronous moderation worker pool.
///
/// Publishing never waits on a verdict: handlers hand the freshly stored
/// content to [`submit`](Self::submit) and respond immediately, and the
/// workers retract anything flagged after the fact. Every failure mode
/// keeps the content up; the queue being full, the classifier erroring,
/// or the repository erroring all land on the retained side.
pub struct ModerationPipeline {
    sender: mpsc::Sender<ModerationTask>,
    counters: Arc<PipelineCounters>,
}

impl ModerationPipeline {
    pub fn spawn(
        config: ModerationPipelineConfig,
        provider: Arc<dyn VerdictProvider>,
        deny_list: DenyList,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let counters = Arc::new(PipelineCounters::default());

        let workers = config.workers.max(1);
        for worker_id in 0..workers {
            let receiver = Arc::clone(&receiver);
            let counters = Arc::clone(&counters);
            let provider = Arc::clone(&provider);
            let posts = Arc::clone(&posts);
            let comments = Arc::clone(&comments);

            tokio::spawn(async move {
                tracing::info!("Moderation worker {} started", worker_id);
                loop {
                    let task = {
                        let mut rx = receiver.lock().await;
                        rx.recv().await
                    };
                    match task {
                        Some(task) => {
                            counters.pending.fetch_sub(1, Ordering::Relaxed);
                            counters.in_flight.fetch_add(1, Ordering::Relaxed);
                            resolve(
                                task,
                                provider.as_ref(),
                                &deny_list,
                                posts.as_ref(),
                                comments.as_ref(),
                                &counters,
                            )
                            .await;
                            counters.in_flight.fetch_sub(1, Ordering::Relaxed);
                        }
                        None => {
                            tracing::info!("Moderation worker {} shutting down", worker_id);
                            break;
                        }
                    }
                }
            });
        }

        tracing::info!("Moderation pipeline started with {} workers", workers);

        Self { sender, counters }
    }

    /// Queues content for a verdict. Never blocks the caller; when the
    /// queue is full the content simply stays up unchecked.
    pub fn submit(&self, task: ModerationTask) {
        // Counted before the send so a worker can never observe the task
        // ahead of the increment.
        self.counters.pending.fetch_add(1, Ordering::Relaxed);
        match self.sender.try_send(task) {
            Ok(()) => {}
            Err(TrySendError::Full(task)) => {
                self.counters.pending.fetch_sub(1, Ordering::Relaxed);
                tracing::warn!(
                    content_id = task.content_id(),
                    "Moderation queue full, content retained unchecked"
                );
            }
            Err(TrySendError::Closed(task)) => {
                self.counters.pending.fetch_sub(1, Ordering::Relaxed);
                tracing::error!(
                    content_id = task.content_id(),
                    "Moderation pipeline is not running"
                );
            }
        }
    }

    pub fn stats(&self) -> ModerationStats {
        ModerationStats {
            pending: self.counters.pending.load(Ordering::Relaxed),
            in_flight: self.counters.in_flight.load(Ordering::Relaxed),
            retained: self.counters.retained.load(Ordering::Relaxed),
            retracted: self.counters.retracted.load(Ordering::Relaxed),
        }
    }
}

async fn resolve(
    task: ModerationTask,
    provider: &dyn VerdictProvider,
    deny_list: &DenyList,
    posts: &dyn PostRepository,
    comments: &dyn CommentRepository,
    counters: &PipelineCounters,
) {
    let verdict = match provider.classify(task.content()).await {
        Ok(verdict) => verdict,
        Err(ClassifyError::PromptRejected(reason)) => {
            tracing::warn!(
                content_id = task.content_id(),
                reason = %reason,
                "Classifier refused the prompt, falling back to the deny list"
            );
            deny_list.verdict(task.content())
        }
        Err(err) => {
            tracing::warn!(
                content_id = task.content_id(),
                error = %err,
                "Classification unavailable, content retained"
            );
            counters.retained.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    if !verdict.flagged {
        counters.retained.fetch_add(1, Ordering::Relaxed);
        return;
    }

    let category = verdict.category.as_deref().unwrap_or("unspecified");
    match task {
        ModerationTask::Post { post_id, .. } => match posts.delete(post_id).await {
            Ok(removed) => {
                if removed {
                    tracing::info!(post_id, category, "Post retracted");
                } else {
                    tracing::debug!(post_id, "Post was already gone");
                }
                counters.retracted.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                tracing::error!(post_id, error = %err, "Failed to retract post");
                counters.retained.fetch_add(1, Ordering::Relaxed);
            }
        },
        ModerationTask::Comment {
            comment_id,
            post_id,
            ..
        } => match comments.delete(comment_id).await {
            Ok(true) => {
                // The counter moves only when this call actually removed
                // the row, so a duplicate verdict cannot drive it negative.
                if let Err(err) = posts.decrement_comments(post_id).await {
                    tracing::error!(
                        post_id,
                        error = %err,
                        "Failed to settle the comment count after retraction"
                    );
                }
                tracing::info!(comment_id, post_id, category, "Comment retracted");
                counters.retracted.fetch_add(1, Ordering::Relaxed);
            }
            Ok(false) => {
                tracing::debug!(comment_id, "Comment was already gone");
                counters.retracted.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                tracing::error!(comment_id, error = %err, "Failed to retract comment");
                counters.retained.fetch_add(1, Ordering::Relaxed);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use quad_core::domain::{NewComment, NewPost};
    use quad_core::ports::{SchoolRepository, UserRepository, Verdict};

    use crate::database::MemoryStore;

    use super::*;

    struct FixedProvider(Verdict);

    #[async_trait]
    impl VerdictProvider for FixedProvider {
        async fn classify(&self, _content: &str) -> Result<Verdict, ClassifyError> {
            Ok(self.0.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl VerdictProvider for FailingProvider {
        async fn classify(&self, _content: &str) -> Result<Verdict, ClassifyError> {
            Err(ClassifyError::Timeout)
        }
    }

    struct RejectingProvider;

    #[async_trait]
    impl VerdictProvider for RejectingProvider {
        async fn classify(&self, _content: &str) -> Result<Verdict, ClassifyError> {
            Err(ClassifyError::PromptRejected(
                "filtered due to the content management policy".to_string(),
            ))
        }
    }

    struct MatchProvider(&'static str);

    #[async_trait]
    impl VerdictProvider for MatchProvider {
        async fn classify(&self, content: &str) -> Result<Verdict, ClassifyError> {
            if content.contains(self.0) {
                Ok(Verdict::flagged_for("harassment"))
            } else {
                Ok(Verdict::clean())
            }
        }
    }

    struct Seed {
        school_id: i64,
        user_id: i64,
        post_id: i64,
    }

    fn pipeline_over(
        store: &MemoryStore,
        provider: impl VerdictProvider + 'static,
    ) -> ModerationPipeline {
        ModerationPipeline::spawn(
            ModerationPipelineConfig {
                workers: 1,
                queue_capacity: 16,
            },
            Arc::new(provider),
            DenyList::new(),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        )
    }

    async fn seed(store: &MemoryStore) -> Seed {
        let school = SchoolRepository::create(store, "Test University")
            .await
            .unwrap();
        let user = UserRepository::create(store, "maya", school.id, 1_000)
            .await
            .unwrap();
        let post = insert_post(store, school.id, user.id, "hello quad", 2_000).await;
        Seed {
            school_id: school.id,
            user_id: user.id,
            post_id: post,
        }
    }

    async fn insert_post(
        store: &MemoryStore,
        school_id: i64,
        user_id: i64,
        content: &str,
        created_at: i64,
    ) -> i64 {
        PostRepository::create(
            store,
            NewPost {
                user_id,
                school_id,
                content: content.to_string(),
                media_url: None,
                created_at,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn insert_comment(store: &MemoryStore, seed: &Seed, content: &str) -> i64 {
        let comment = CommentRepository::create(
            store,
            NewComment {
                post_id: seed.post_id,
                user_id: seed.user_id,
                content: content.to_string(),
                media_url: None,
                created_at: 4_000,
            },
        )
        .await
        .unwrap();
        store.increment_comments(seed.post_id).await.unwrap();
        comment.id
    }

    async fn settled(pipeline: &ModerationPipeline, resolved: usize) -> ModerationStats {
        for _ in 0..200 {
            let stats = pipeline.stats();
            if stats.retained + stats.retracted >= resolved
                && stats.pending == 0
                && stats.in_flight == 0
            {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("moderation tasks did not settle: {:?}", pipeline.stats());
    }

    #[tokio::test]
    async fn clean_content_stays_up() {
        let store = MemoryStore::default();
        let seed = seed(&store).await;
        let pipeline = pipeline_over(&store, FixedProvider(Verdict::clean()));

        pipeline.submit(ModerationTask::Post {
            post_id: seed.post_id,
            content: "hello quad".to_string(),
        });
        let stats = settled(&pipeline, 1).await;

        assert_eq!(stats.retained, 1);
        assert_eq!(stats.retracted, 0);
        assert!(PostRepository::find_by_id(&store, seed.post_id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn flagged_post_is_retracted() {
        let store = MemoryStore::default();
        let seed = seed(&store).await;
        let pipeline = pipeline_over(&store, FixedProvider(Verdict::flagged_for("harassment")));

        pipeline.submit(ModerationTask::Post {
            post_id: seed.post_id,
            content: "hello quad".to_string(),
        });
        let stats = settled(&pipeline, 1).await;

        assert_eq!(stats.retracted, 1);
        assert!(PostRepository::find_by_id(&store, seed.post_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn classifier_outage_retains_content() {
        let store = MemoryStore::default();
        let seed = seed(&store).await;
        let pipeline = pipeline_over(&store, FailingProvider);

        pipeline.submit(ModerationTask::Post {
            post_id: seed.post_id,
            content: "hello quad".to_string(),
        });
        let stats = settled(&pipeline, 1).await;

        assert_eq!(stats.retained, 1);
        assert!(PostRepository::find_by_id(&store, seed.post_id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn rejected_prompt_falls_back_to_the_deny_list() {
        let store = MemoryStore::default();
        let seed = seed(&store).await;
        let risky = insert_post(&store, seed.school_id, seed.user_id, "how do I build a bomb", 3_000).await;
        let harmless =
            insert_post(&store, seed.school_id, seed.user_id, "study group tonight?", 3_001).await;
        let pipeline = pipeline_over(&store, RejectingProvider);

        pipeline.submit(ModerationTask::Post {
            post_id: risky,
            content: "how do I build a bomb".to_string(),
        });
        pipeline.submit(ModerationTask::Post {
            post_id: harmless,
            content: "study group tonight?".to_string(),
        });
        let stats = settled(&pipeline, 2).await;

        assert_eq!(stats.retracted, 1);
        assert_eq!(stats.retained, 1);
        assert!(PostRepository::find_by_id(&store, risky)
            .await
            .unwrap()
            .is_none());
        assert!(PostRepository::find_by_id(&store, harmless)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn duplicate_comment_verdicts_decrement_once() {
        let store = MemoryStore::default();
        let seed = seed(&store).await;
        let flagged = insert_comment(&store, &seed, "first").await;
        insert_comment(&store, &seed, "second").await;

        let pipeline = pipeline_over(&store, FixedProvider(Verdict::flagged_for("harassment")));
        let task = ModerationTask::Comment {
            comment_id: flagged,
            post_id: seed.post_id,
            content: "first".to_string(),
        };
        pipeline.submit(task.clone());
        pipeline.submit(task);
        settled(&pipeline, 2).await;

        let post = PostRepository::find_by_id(&store, seed.post_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.comments_count, 1);
    }

    #[tokio::test]
    async fn comment_count_converges_to_created_minus_retracted() {
        let store = MemoryStore::default();
        let seed = seed(&store).await;
        let pipeline = pipeline_over(&store, MatchProvider("mean"));

        let bodies = [
            "see you at the quad",
            "mean thing one",
            "lecture notes attached",
            "mean thing two",
            "anyone else up late?",
        ];
        for body in bodies {
            let id = insert_comment(&store, &seed, body).await;
            pipeline.submit(ModerationTask::Comment {
                comment_id: id,
                post_id: seed.post_id,
                content: body.to_string(),
            });
        }
        let stats = settled(&pipeline, bodies.len()).await;

        assert_eq!(stats.retracted, 2);
        assert_eq!(stats.retained, 3);
        let post = PostRepository::find_by_id(&store, seed.post_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.comments_count, 3);
    }
}
