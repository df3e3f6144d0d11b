//! Application context: wires the store, cache, session directory and
//! security components the services are built from.

use crate::cache::{CacheInterface, CacheInvalidator, MemoryCache, RedisCacheService};
use crate::gate::AuthorizationGate;
use crate::r#impl::{ArticleServiceImpl, UserServiceImpl};
use crate::session::{MemorySessionDirectory, RedisSessionDirectory, SessionDirectory};
use scribe_config::{AppConfig, CacheConfig, ConfigLoader, RedisConfig, StorageBackend};
use scribe_core::telemetry::init_telemetry;
use scribe_core::{HealthCheck, HealthStatus, ScribeError, ScribeResult};
use scribe_repository::{
    create_pool, ArticleRepository, DatabasePoolInterface, MemoryArticleRepository, MemoryDatabase,
    MemoryUserRepository, MySqlArticleRepository, MySqlTransactionManager, MySqlUserRepository,
    TransactionManager, UserRepository,
};
use scribe_security::{PasswordHasher, PasswordHasherInterface, TokenProvider, TokenProviderInterface};
use std::sync::Arc;
use tracing::info;

/// Shared components the services are built from.
///
/// Fields are public so tests can swap in doubles before building a
/// service. [`with_cache`](Self::with_cache) also restarts the
/// invalidation worker on the new cache.
#[derive(Clone)]
pub struct AppContext {
    pub users: Arc<dyn UserRepository>,
    pub articles: Arc<dyn ArticleRepository>,
    pub transactions: Arc<dyn TransactionManager>,
    pub sessions: Arc<dyn SessionDirectory>,
    pub cache: Arc<dyn CacheInterface>,
    pub invalidator: CacheInvalidator,
    pub password_hasher: Arc<dyn PasswordHasherInterface>,
    pub token_provider: Arc<dyn TokenProviderInterface>,
    cache_config: CacheConfig,
    health_checks: Vec<Arc<dyn HealthCheck>>,
}

impl AppContext {
    /// Loads layered configuration from `config_dir`, installs the tracing
    /// subscriber and connects.
    pub async fn bootstrap(config_dir: &str) -> ScribeResult<Self> {
        let config = ConfigLoader::new(config_dir)?.get().await;
        init_telemetry(&config.observability.telemetry())?;

        info!(
            app = %config.app.name,
            environment = %config.app.environment,
            backend = ?config.database.backend,
            redis = config.redis.enabled,
            "Starting Scribe"
        );
        Self::connect(&config).await
    }

    /// Connects every backend named by the configuration.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn connect(config: &AppConfig) -> ScribeResult<Self> {
        let mut health_checks: Vec<Arc<dyn HealthCheck>> = Vec::new();

        let (users, articles, transactions): (
            Arc<dyn UserRepository>,
            Arc<dyn ArticleRepository>,
            Arc<dyn TransactionManager>,
        ) = match config.database.backend {
            StorageBackend::Mysql => {
                let pool = create_pool(&config.database).await?;
                health_checks.push(pool.clone());
                let pool: Arc<dyn DatabasePoolInterface> = pool;
                (
                    Arc::new(MySqlUserRepository::new(Arc::clone(&pool))),
                    Arc::new(MySqlArticleRepository::new(Arc::clone(&pool))),
                    Arc::new(MySqlTransactionManager::new(pool)),
                )
            }
            StorageBackend::Memory => {
                info!("Using in-memory entity store");
                let db = MemoryDatabase::new();
                (
                    Arc::new(MemoryUserRepository::new(db.clone())),
                    Arc::new(MemoryArticleRepository::new(db.clone())),
                    Arc::new(db),
                )
            }
        };

        let (cache, sessions): (Arc<dyn CacheInterface>, Arc<dyn SessionDirectory>) = if config.redis.enabled {
            let pool = create_redis_pool(&config.redis)?;
            let cache = Arc::new(RedisCacheService::new(Arc::clone(&pool)));
            health_checks.push(cache.clone());
            (cache, Arc::new(RedisSessionDirectory::new(pool)))
        } else {
            info!("Redis disabled, using in-process cache and sessions");
            (Arc::new(MemoryCache::new()), Arc::new(MemorySessionDirectory::new()))
        };

        let mut context = Self::assemble(config, users, articles, transactions, sessions, cache);
        context.health_checks = health_checks;
        Ok(context)
    }

    /// Builds a context backed entirely by process memory.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn in_memory(config: &AppConfig) -> Self {
        let db = MemoryDatabase::new();
        Self::assemble(
            config,
            Arc::new(MemoryUserRepository::new(db.clone())),
            Arc::new(MemoryArticleRepository::new(db.clone())),
            Arc::new(db),
            Arc::new(MemorySessionDirectory::new()),
            Arc::new(MemoryCache::new()),
        )
    }

    fn assemble(
        config: &AppConfig,
        users: Arc<dyn UserRepository>,
        articles: Arc<dyn ArticleRepository>,
        transactions: Arc<dyn TransactionManager>,
        sessions: Arc<dyn SessionDirectory>,
        cache: Arc<dyn CacheInterface>,
    ) -> Self {
        let invalidator = CacheInvalidator::spawn(Arc::clone(&cache), &config.cache);

        Self {
            users,
            articles,
            transactions,
            sessions,
            cache,
            invalidator,
            password_hasher: Arc::new(PasswordHasher::from_config(&config.security)),
            token_provider: Arc::new(TokenProvider::new(Arc::new(config.security.clone()))),
            cache_config: config.cache.clone(),
            health_checks: Vec::new(),
        }
    }

    /// Replaces the cache and restarts the invalidation worker on it.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CacheInterface>) -> Self {
        self.invalidator = CacheInvalidator::spawn(Arc::clone(&cache), &self.cache_config);
        self.cache = cache;
        self
    }

    /// Replaces the session directory.
    #[must_use]
    pub fn with_sessions(mut self, sessions: Arc<dyn SessionDirectory>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Replaces the article repository.
    #[must_use]
    pub fn with_articles(mut self, articles: Arc<dyn ArticleRepository>) -> Self {
        self.articles = articles;
        self
    }

    /// Builds the authorization gate over the session directory.
    #[must_use]
    pub fn gate(&self) -> AuthorizationGate {
        AuthorizationGate::new(Arc::clone(&self.sessions))
    }

    /// Builds the user service.
    #[must_use]
    pub fn user_service(&self) -> UserServiceImpl {
        UserServiceImpl::new(self)
    }

    /// Builds the article service.
    #[must_use]
    pub fn article_service(&self) -> ArticleServiceImpl {
        ArticleServiceImpl::new(self)
    }

    /// Runs every registered backend health check.
    pub async fn health(&self) -> Vec<(String, HealthStatus)> {
        let mut results = Vec::with_capacity(self.health_checks.len());
        for check in &self.health_checks {
            results.push((check.name().to_string(), check.check().await));
        }
        results
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("invalidator", &self.invalidator)
            .field("health_checks", &self.health_checks.len())
            .finish_non_exhaustive()
    }
}

fn create_redis_pool(config: &RedisConfig) -> ScribeResult<Arc<deadpool_redis::Pool>> {
    let mut redis_cfg = deadpool_redis::Config::from_url(&config.url);
    redis_cfg.pool = Some(deadpool_redis::PoolConfig::new(config.pool_size as usize));

    let pool = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .map_err(|e| ScribeError::Configuration(format!("Failed to create Redis pool: {}", e)))?;

    info!("Redis connection pool created");
    Ok(Arc::new(pool))
}
