//! Application state - shared across all handlers.

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use quad_core::ports::{
    CommentRepository, PostRepository, RateLimiter, SchoolRepository, UserRepository,
    VerdictProvider,
};
use quad_infra::database::{
    self, MemoryStore, PostgresCommentRepository, PostgresPostRepository, PostgresSchoolRepository,
    PostgresUserRepository,
};
use quad_infra::moderation::{
    ChatClassifier, DenyList, ModerationPipeline, ModerationPipelineConfig,
};
use quad_infra::rate_limit::{InMemoryRateLimiter, RedisRateLimiter};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub schools: Arc<dyn SchoolRepository>,
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    /// `None` disables rate limiting entirely.
    pub limiter: Option<Arc<dyn RateLimiter>>,
    pub moderation: Arc<ModerationPipeline>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let provider = Self::classifier_from_env();
        let limiter = Self::limiter_from_env().await;

        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::with_store(MemoryStore::default(), provider, limiter);
        };

        match database::connect(db_config).await {
            Ok(db) => {
                if let Err(err) = Migrator::up(&db, None).await {
                    tracing::error!(
                        "Failed to run migrations: {}. Using in-memory fallback.",
                        err
                    );
                    return Self::with_store(MemoryStore::default(), provider, limiter);
                }

                Self::assemble(
                    Arc::new(PostgresSchoolRepository::new(db.clone())),
                    Arc::new(PostgresUserRepository::new(db.clone())),
                    Arc::new(PostgresPostRepository::new(db.clone())),
                    Arc::new(PostgresCommentRepository::new(db)),
                    provider,
                    limiter,
                )
            }
            Err(err) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    err
                );
                Self::with_store(MemoryStore::default(), provider, limiter)
            }
        }
    }

    /// State over the in-process store. This is the no-database fallback
    /// and the backing for the HTTP test suites.
    pub fn with_store(
        store: MemoryStore,
        provider: Arc<dyn VerdictProvider>,
        limiter: Option<Arc<dyn RateLimiter>>,
    ) -> Self {
        let posts: Arc<dyn PostRepository> = Arc::new(store.clone());
        let comments: Arc<dyn CommentRepository> = Arc::new(store.clone());

        Self::assemble(
            Arc::new(store.clone()),
            Arc::new(store),
            posts,
            comments,
            provider,
            limiter,
        )
    }

    fn assemble(
        schools: Arc<dyn SchoolRepository>,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        provider: Arc<dyn VerdictProvider>,
        limiter: Option<Arc<dyn RateLimiter>>,
    ) -> Self {
        let moderation = Arc::new(ModerationPipeline::spawn(
            ModerationPipelineConfig::from_env(),
            provider,
            DenyList::new(),
            Arc::clone(&posts),
            Arc::clone(&comments),
        ));

        tracing::info!("Application state initialized");

        Self {
            schools,
            users,
            posts,
            comments,
            limiter,
            moderation,
        }
    }

    fn classifier_from_env() -> Arc<dyn VerdictProvider> {
        let classifier = ChatClassifier::from_env();
        if !classifier.is_configured() {
            tracing::warn!("No moderation API token set, classification will fail open");
        }
        Arc::new(classifier)
    }

    async fn limiter_from_env() -> Option<Arc<dyn RateLimiter>> {
        if std::env::var("REDIS_URL").is_ok() {
            match RedisRateLimiter::from_env().await {
                Ok(limiter) => Some(Arc::new(limiter)),
                Err(err) => {
                    tracing::warn!(error = %err, "Redis unavailable, rate limiting disabled");
                    None
                }
            }
        } else {
            tracing::info!("REDIS_URL not set, using the in-process rate limiter");
            Some(Arc::new(InMemoryRateLimiter::from_env()))
        }
    }
}
