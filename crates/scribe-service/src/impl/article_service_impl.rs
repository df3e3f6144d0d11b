//! Article service implementation.

use crate::article_service::ArticleService;
use crate::cache::{cache_keys, CacheExt, CacheInterface, CacheInvalidator};
use crate::context::AppContext;
use crate::dto::{ArticleQuery, ArticleResponse, CreateArticleRequest, UpdateArticleRequest};
use crate::gate::AuthorizationGate;
use async_trait::async_trait;
use scribe_core::{Article, ArticleId, NewArticle, ScribeError, ScribeResult, UserId, ValidateExt};
use scribe_repository::{run_in_transaction, ArticleRepository, TransactionManager, UserRepository};
use std::sync::Arc;
use tracing::{debug, info};

/// Article use-cases with read-through caching.
#[derive(Clone)]
pub struct ArticleServiceImpl {
    users: Arc<dyn UserRepository>,
    articles: Arc<dyn ArticleRepository>,
    transactions: Arc<dyn TransactionManager>,
    gate: AuthorizationGate,
    cache: Arc<dyn CacheInterface>,
    invalidator: CacheInvalidator,
}

impl ArticleServiceImpl {
    /// Creates the service from the application context.
    #[must_use]
    pub fn new(context: &AppContext) -> Self {
        Self {
            users: Arc::clone(&context.users),
            articles: Arc::clone(&context.articles),
            transactions: Arc::clone(&context.transactions),
            gate: context.gate(),
            cache: Arc::clone(&context.cache),
            invalidator: context.invalidator.clone(),
        }
    }

    fn project(articles: Vec<Article>) -> Vec<ArticleResponse> {
        articles.into_iter().map(ArticleResponse::from).collect()
    }

    /// Loads a live article for a mutation, checking the acting user owns it.
    async fn load_owned(&self, user_id: UserId, id: ArticleId) -> ScribeResult<Article> {
        let article = self
            .articles
            .find_by_id(id)
            .await?
            .ok_or_else(|| ScribeError::not_found("Article", id))?;

        self.gate.require_ownership(&article, user_id)?;
        Ok(article)
    }

    async fn resolve_author(&self, name: &str) -> ScribeResult<UserId> {
        self.users
            .find_by_name(name)
            .await?
            .map(|user| user.id)
            .ok_or_else(|| ScribeError::not_found("Author", name))
    }
}

#[async_trait]
impl ArticleService for ArticleServiceImpl {
    async fn create_article(&self, author_id: UserId, request: CreateArticleRequest) -> ScribeResult<ArticleResponse> {
        debug!("Creating article for user {}", author_id);

        self.gate.require_session(author_id).await?;
        request.validate_request()?;

        let author = self
            .users
            .find_by_id(author_id)
            .await?
            .ok_or_else(|| ScribeError::not_found("User", author_id))?;

        let new_article = NewArticle {
            title: request.title,
            body: request.content,
            author_id,
        };

        let articles = Arc::clone(&self.articles);
        let article = run_in_transaction(self.transactions.as_ref(), move |tx| {
            Box::pin(async move { articles.create(tx, new_article).await })
        })
        .await?;

        self.invalidator.invalidate(cache_keys::article_created_set()).await;

        info!("Article created: {} by {}", article.id, author_id);
        Ok(ArticleResponse::from(article.with_author(Some(author))))
    }

    async fn get_all_articles(&self) -> ScribeResult<Vec<ArticleResponse>> {
        debug!("Listing all articles");

        self.cache
            .get_or_load(&cache_keys::all_articles(), || async {
                self.articles.find_all().await.map(Self::project)
            })
            .await
    }

    async fn get_article(&self, id: ArticleId) -> ScribeResult<ArticleResponse> {
        debug!("Getting article: {}", id);

        self.cache
            .get_or_load(&cache_keys::article_by_id(id), || async {
                self.articles
                    .find_by_id(id)
                    .await?
                    .map(ArticleResponse::from)
                    .ok_or_else(|| ScribeError::not_found("Article", id))
            })
            .await
    }

    async fn get_articles_by_author(&self, author_id: UserId) -> ScribeResult<Vec<ArticleResponse>> {
        debug!("Listing articles by author: {}", author_id);

        self.cache
            .get_or_load(&cache_keys::articles_by_author(author_id), || async {
                self.articles.find_by_author(author_id).await.map(Self::project)
            })
            .await
    }

    async fn search_articles(&self, query: &str) -> ScribeResult<Vec<ArticleResponse>> {
        debug!("Searching articles for '{}'", query);
        self.articles.search(query).await.map(Self::project)
    }

    async fn search_articles_by_author(&self, author_id: UserId, query: &str) -> ScribeResult<Vec<ArticleResponse>> {
        debug!("Searching articles of {} for '{}'", author_id, query);
        self.articles
            .search_by_author(author_id, query)
            .await
            .map(Self::project)
    }

    async fn find_articles(&self, query: ArticleQuery) -> ScribeResult<Vec<ArticleResponse>> {
        match (query.author(), query.search()) {
            (Some(author), Some(search)) => {
                let author_id = self.resolve_author(author).await?;
                self.search_articles_by_author(author_id, search).await
            }
            (None, Some(search)) => self.search_articles(search).await,
            (Some(author), None) => {
                let author_id = self.resolve_author(author).await?;
                self.get_articles_by_author(author_id).await
            }
            (None, None) => self.get_all_articles().await,
        }
    }

    async fn update_article(
        &self,
        user_id: UserId,
        id: ArticleId,
        request: UpdateArticleRequest,
    ) -> ScribeResult<ArticleResponse> {
        debug!("Updating article {} for user {}", id, user_id);

        self.gate.require_session(user_id).await?;
        request.validate_request()?;

        let mut article = self.load_owned(user_id, id).await?;
        let author = article.author.clone();
        article.apply_changes(request.title, request.content);

        let articles = Arc::clone(&self.articles);
        let updated = run_in_transaction(self.transactions.as_ref(), move |tx| {
            Box::pin(async move { articles.update(tx, &article).await })
        })
        .await?;

        self.invalidator
            .invalidate(cache_keys::article_changed_set(id, updated.author_id))
            .await;

        info!("Article updated: {}", id);
        Ok(ArticleResponse::from(updated.with_author(author)))
    }

    async fn delete_article(&self, user_id: UserId, id: ArticleId) -> ScribeResult<()> {
        debug!("Deleting article {} for user {}", id, user_id);

        self.gate.require_session(user_id).await?;

        let article = self.load_owned(user_id, id).await?;

        let articles = Arc::clone(&self.articles);
        run_in_transaction(self.transactions.as_ref(), move |tx| {
            Box::pin(async move { articles.soft_delete(tx, id).await })
        })
        .await?;

        self.invalidator
            .invalidate(cache_keys::article_changed_set(id, article.author_id))
            .await;

        info!("Article deleted: {}", id);
        Ok(())
    }
}

impl std::fmt::Debug for ArticleServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::RegisterRequest;
    use crate::user_service::UserService;
    use scribe_config::{AppConfig, StorageBackend};

    struct Fixture {
        context: AppContext,
        service: ArticleServiceImpl,
    }

    impl Fixture {
        fn new() -> Self {
            let mut config = AppConfig::default();
            config.database.backend = StorageBackend::Memory;
            config.redis.enabled = false;
            config.security.password_hash_cost = 1;
            let context = AppContext::in_memory(&config);
            let service = context.article_service();
            Self { context, service }
        }

        async fn register(&self, email: &str, name: &str) -> UserId {
            self.context
                .user_service()
                .register(RegisterRequest {
                    name: name.to_string(),
                    email: email.to_string(),
                    password: "p".to_string(),
                    password_confirmation: "p".to_string(),
                })
                .await
                .unwrap()
                .user
                .id
        }

        async fn publish(&self, author: UserId, title: &str, content: &str) -> ArticleResponse {
            self.service
                .create_article(
                    author,
                    CreateArticleRequest {
                        title: title.to_string(),
                        content: content.to_string(),
                    },
                )
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_create_attaches_author() {
        let fx = Fixture::new();
        let ada = fx.register("a@x.com", "Ada").await;

        let article = fx.publish(ada, "T", "C").await;
        assert_eq!(article.title, "T");
        assert_eq!(article.content, "C");
        assert_eq!(article.author_id, ada);
        assert_eq!(article.author.map(|a| a.name), Some("Ada".to_string()));
    }

    #[tokio::test]
    async fn test_create_requires_session() {
        let fx = Fixture::new();
        let ada = fx.register("a@x.com", "Ada").await;
        fx.context.user_service().logout(ada).await.unwrap();

        let result = fx
            .service
            .create_article(
                ada,
                CreateArticleRequest {
                    title: "T".to_string(),
                    content: "C".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(ScribeError::NotLoggedIn)));
        assert!(fx.context.articles.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let fx = Fixture::new();
        let ada = fx.register("a@x.com", "Ada").await;

        let result = fx
            .service
            .create_article(
                ada,
                CreateArticleRequest {
                    title: "T".to_string(),
                    content: String::new(),
                },
            )
            .await;
        assert!(matches!(result, Err(ScribeError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_missing_article() {
        let fx = Fixture::new();
        let result = fx.service.get_article(ArticleId(99)).await;
        assert!(matches!(
            result,
            Err(ScribeError::NotFound { resource_type: "Article", .. })
        ));
        assert!(fx
            .context
            .cache
            .get_raw(&cache_keys::article_by_id(ArticleId(99)))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_find_articles_dispatch() {
        let fx = Fixture::new();
        let ada = fx.register("a@x.com", "Ada").await;
        let bob = fx.register("b@x.com", "Bob").await;
        fx.publish(ada, "Rust ownership", "borrowing").await;
        fx.publish(ada, "Gardening", "tomatoes").await;
        fx.publish(bob, "Rust async", "futures").await;

        let all = fx.service.find_articles(ArticleQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let by_ada = fx
            .service
            .find_articles(ArticleQuery {
                author: Some("Ada".to_string()),
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(by_ada.len(), 2);

        let rust = fx
            .service
            .find_articles(ArticleQuery {
                author: None,
                search: Some("Rust".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(rust.len(), 2);

        let ada_rust = fx
            .service
            .find_articles(ArticleQuery {
                author: Some("Ada".to_string()),
                search: Some("Rust".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(ada_rust.len(), 1);
        assert_eq!(ada_rust[0].title, "Rust ownership");

        let unknown = fx
            .service
            .find_articles(ArticleQuery {
                author: Some("Nobody".to_string()),
                search: None,
            })
            .await;
        assert!(matches!(
            unknown,
            Err(ScribeError::NotFound { resource_type: "Author", .. })
        ));
    }

    #[tokio::test]
    async fn test_search_matches_content() {
        let fx = Fixture::new();
        let ada = fx.register("a@x.com", "Ada").await;
        fx.publish(ada, "Title", "needle in body").await;

        assert_eq!(fx.service.search_articles("needle").await.unwrap().len(), 1);
        assert!(fx.service.search_articles("Needle").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_partial_and_ownership() {
        let fx = Fixture::new();
        let ada = fx.register("a@x.com", "Ada").await;
        let bob = fx.register("b@x.com", "Bob").await;
        let article = fx.publish(ada, "T", "C").await;

        let denied = fx
            .service
            .update_article(
                bob,
                article.id,
                UpdateArticleRequest {
                    title: Some("Hijacked".to_string()),
                    content: None,
                },
            )
            .await;
        assert!(matches!(denied, Err(ScribeError::NotAllowed(_))));

        let updated = fx
            .service
            .update_article(
                ada,
                article.id,
                UpdateArticleRequest {
                    title: Some("T2".to_string()),
                    content: Some(String::new()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "T2");
        assert_eq!(updated.content, "C");
        assert_eq!(updated.author.map(|a| a.id), Some(ada));
    }

    #[tokio::test]
    async fn test_update_missing_article() {
        let fx = Fixture::new();
        let ada = fx.register("a@x.com", "Ada").await;

        let result = fx
            .service
            .update_article(ada, ArticleId(42), UpdateArticleRequest::default())
            .await;
        assert!(matches!(result, Err(ScribeError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_invalidates_reads() {
        let fx = Fixture::new();
        let ada = fx.register("a@x.com", "Ada").await;
        let article = fx.publish(ada, "T", "C").await;

        assert_eq!(fx.service.get_all_articles().await.unwrap().len(), 1);
        fx.service.get_article(article.id).await.unwrap();

        fx.service.delete_article(ada, article.id).await.unwrap();

        assert!(fx.service.get_all_articles().await.unwrap().is_empty());
        assert!(fx.service.get_articles_by_author(ada).await.unwrap().is_empty());
        assert!(matches!(
            fx.service.get_article(article.id).await,
            Err(ScribeError::NotFound { .. })
        ));
    }
}
