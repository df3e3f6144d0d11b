//! User service implementation.

use crate::cache::{cache_keys, CacheInvalidator};
use crate::context::AppContext;
use crate::dto::{AuthResponse, LoginRequest, RegisterRequest, UpdateUserRequest, UserResponse};
use crate::gate::AuthorizationGate;
use crate::session::SessionDirectory;
use crate::user_service::UserService;
use async_trait::async_trait;
use scribe_core::{ArticleId, NewUser, ScribeError, ScribeResult, UserId, ValidateExt};
use scribe_repository::{run_in_transaction, ArticleRepository, TransactionManager, UserRepository};
use scribe_security::{PasswordHasherInterface, TokenProviderInterface};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Account use-cases over the entity store and session directory.
#[derive(Clone)]
pub struct UserServiceImpl {
    users: Arc<dyn UserRepository>,
    articles: Arc<dyn ArticleRepository>,
    transactions: Arc<dyn TransactionManager>,
    sessions: Arc<dyn SessionDirectory>,
    gate: AuthorizationGate,
    invalidator: CacheInvalidator,
    password_hasher: Arc<dyn PasswordHasherInterface>,
    token_provider: Arc<dyn TokenProviderInterface>,
}

impl UserServiceImpl {
    /// Creates the service from the application context.
    #[must_use]
    pub fn new(context: &AppContext) -> Self {
        Self {
            users: Arc::clone(&context.users),
            articles: Arc::clone(&context.articles),
            transactions: Arc::clone(&context.transactions),
            sessions: Arc::clone(&context.sessions),
            gate: context.gate(),
            invalidator: context.invalidator.clone(),
            password_hasher: Arc::clone(&context.password_hasher),
            token_provider: Arc::clone(&context.token_provider),
        }
    }

    /// Issues a token and records it as the user's session.
    async fn open_session(&self, user_id: UserId) -> ScribeResult<String> {
        let token = self.token_provider.issue(user_id)?;
        self.sessions.set(user_id, &token).await?;
        Ok(token)
    }

    /// Drops every cached entry that embeds the user's projection.
    async fn invalidate_author(&self, user_id: UserId) {
        let article_ids: Vec<ArticleId> = match self.articles.find_by_author(user_id).await {
            Ok(articles) => articles.into_iter().map(|a| a.id).collect(),
            Err(e) => {
                warn!("Could not list articles of user {} for invalidation: {}", user_id, e);
                Vec::new()
            }
        };
        self.invalidator
            .invalidate(cache_keys::author_changed_set(user_id, article_ids))
            .await;
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn register(&self, request: RegisterRequest) -> ScribeResult<AuthResponse> {
        debug!("Registering user: {}", request.email);

        request.validate_request()?;

        if self.users.exists_by_email(&request.email).await? {
            return Err(ScribeError::already_exists(format!(
                "Email '{}' already exists",
                request.email
            )));
        }

        if request.password != request.password_confirmation {
            return Err(ScribeError::PasswordMismatch);
        }

        let new_user = NewUser {
            email: request.email,
            name: request.name,
            password_hash: self.password_hasher.hash(&request.password)?,
        };

        let users = Arc::clone(&self.users);
        let user = run_in_transaction(self.transactions.as_ref(), move |tx| {
            Box::pin(async move { users.create(tx, new_user).await })
        })
        .await?;

        let token = self.open_session(user.id).await?;

        info!("User registered: {}", user.id);
        Ok(AuthResponse {
            token,
            user: UserResponse::from(user),
        })
    }

    async fn login(&self, request: LoginRequest) -> ScribeResult<AuthResponse> {
        debug!("Login attempt: {}", request.email);

        request.validate_request()?;

        let Some(user) = self.users.find_by_email(&request.email).await? else {
            warn!("Login failed: no account for {}", request.email);
            return Err(ScribeError::not_found("User", &request.email));
        };

        if !self.password_hasher.verify(&request.password, &user.password_hash)? {
            warn!("Login failed: wrong password for user {}", user.id);
            return Err(ScribeError::WrongPassword);
        }

        let token = self.open_session(user.id).await?;

        info!("User logged in: {}", user.id);
        Ok(AuthResponse {
            token,
            user: UserResponse::from(user),
        })
    }

    async fn logout(&self, user_id: UserId) -> ScribeResult<()> {
        debug!("Logging out user: {}", user_id);

        self.gate.require_session(user_id).await?;
        self.sessions.delete(user_id).await?;

        info!("User logged out: {}", user_id);
        Ok(())
    }

    async fn get_user(&self, user_id: UserId) -> ScribeResult<UserResponse> {
        debug!("Getting user: {}", user_id);

        self.gate.require_session(user_id).await?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ScribeError::not_found("User", user_id))?;

        Ok(UserResponse::from(user))
    }

    async fn get_user_by_name(&self, name: &str) -> ScribeResult<UserResponse> {
        debug!("Getting user by name: {}", name);

        let user = self
            .users
            .find_by_name(name)
            .await?
            .ok_or_else(|| ScribeError::not_found("Author", name))?;

        Ok(UserResponse::from(user))
    }

    async fn update_user(&self, user_id: UserId, request: UpdateUserRequest) -> ScribeResult<UserResponse> {
        debug!("Updating user: {}", user_id);

        self.gate.require_session(user_id).await?;
        request.validate_request()?;

        if !request.confirmation_matches() {
            return Err(ScribeError::PasswordMismatch);
        }

        let users = Arc::clone(&self.users);
        let hasher = Arc::clone(&self.password_hasher);
        let (user, projection_changed) = run_in_transaction(self.transactions.as_ref(), move |tx| {
            Box::pin(async move {
                let mut user = users
                    .find_by_id(user_id)
                    .await?
                    .ok_or_else(|| ScribeError::not_found("User", user_id))?;
                let mut projection_changed = false;

                if let Some(password) = request.new_password() {
                    user.update_password(hasher.hash(password)?);
                }

                if let Some(email) = request.new_email() {
                    if email != user.email {
                        if users.exists_by_email(email).await? {
                            return Err(ScribeError::already_exists(format!(
                                "Email '{}' already exists",
                                email
                            )));
                        }
                        user.change_email(email.to_string());
                        projection_changed = true;
                    }
                }

                if let Some(name) = request.new_name() {
                    if name != user.name {
                        user.change_name(name.to_string());
                        projection_changed = true;
                    }
                }

                let user = users.update(tx, &user).await?;
                Ok((user, projection_changed))
            })
        })
        .await?;

        if projection_changed {
            self.invalidate_author(user_id).await;
        }

        info!("User updated: {}", user_id);
        Ok(UserResponse::from(user))
    }

    async fn delete_account(&self, user_id: UserId) -> ScribeResult<()> {
        debug!("Deleting account: {}", user_id);

        self.gate.require_session(user_id).await?;

        let users = Arc::clone(&self.users);
        run_in_transaction(self.transactions.as_ref(), move |tx| {
            Box::pin(async move { users.soft_delete(tx, user_id).await })
        })
        .await?;

        self.invalidate_author(user_id).await;
        self.sessions.delete(user_id).await?;

        info!("Account deleted: {}", user_id);
        Ok(())
    }
}

impl std::fmt::Debug for UserServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article_service::ArticleService;
    use crate::dto::CreateArticleRequest;
    use scribe_config::{AppConfig, StorageBackend};

    fn test_context() -> AppContext {
        let mut config = AppConfig::default();
        config.database.backend = StorageBackend::Memory;
        config.redis.enabled = false;
        config.security.password_hash_cost = 1;
        AppContext::in_memory(&config)
    }

    fn register_request(email: &str, name: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: "p".to_string(),
            password_confirmation: "p".to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_opens_session() {
        let context = test_context();
        let service = context.user_service();

        let auth = service.register(register_request("a@x.com", "Ada")).await.unwrap();
        assert_eq!(auth.user.email, "a@x.com");
        assert!(!auth.token.is_empty());

        let stored = context.sessions.get(auth.user.id).await.unwrap();
        assert_eq!(stored.as_deref(), Some(auth.token.as_str()));

        let claims = context.token_provider.validate(&auth.token).unwrap();
        assert_eq!(claims.user_id(), Some(auth.user.id));
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let context = test_context();
        let auth = context
            .user_service()
            .register(register_request("a@x.com", "Ada"))
            .await
            .unwrap();

        let user = context.users.find_by_id(auth.user.id).await.unwrap().unwrap();
        assert_ne!(user.password_hash, "p");
        assert!(context.password_hasher.verify("p", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let service = test_context().user_service();
        service.register(register_request("a@x.com", "Ada")).await.unwrap();

        let result = service.register(register_request("a@x.com", "Other")).await;
        assert!(matches!(result, Err(ScribeError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_register_password_mismatch() {
        let service = test_context().user_service();
        let mut request = register_request("a@x.com", "Ada");
        request.password_confirmation = "q".to_string();

        let result = service.register(request).await;
        assert!(matches!(result, Err(ScribeError::PasswordMismatch)));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input() {
        let service = test_context().user_service();
        let result = service.register(register_request("nope", "Ada")).await;
        assert!(matches!(result, Err(ScribeError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_failures_are_distinguishable() {
        let service = test_context().user_service();
        service.register(register_request("a@x.com", "Ada")).await.unwrap();

        let unknown = service.login(login_request("b@x.com", "p")).await;
        assert!(matches!(unknown, Err(ScribeError::NotFound { .. })));

        let wrong = service.login(login_request("a@x.com", "wrong")).await;
        assert!(matches!(wrong, Err(ScribeError::WrongPassword)));
    }

    #[tokio::test]
    async fn test_login_replaces_session_token() {
        let context = test_context();
        let service = context.user_service();
        let registered = service.register(register_request("a@x.com", "Ada")).await.unwrap();

        let logged_in = service.login(login_request("a@x.com", "p")).await.unwrap();
        assert_ne!(registered.token, logged_in.token);

        let stored = context.sessions.get(logged_in.user.id).await.unwrap();
        assert_eq!(stored.as_deref(), Some(logged_in.token.as_str()));
    }

    #[tokio::test]
    async fn test_logout_closes_session() {
        let service = test_context().user_service();
        let auth = service.register(register_request("a@x.com", "Ada")).await.unwrap();

        service.logout(auth.user.id).await.unwrap();
        assert!(matches!(service.get_user(auth.user.id).await, Err(ScribeError::NotLoggedIn)));
        assert!(matches!(service.logout(auth.user.id).await, Err(ScribeError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_get_user_by_name_is_public() {
        let service = test_context().user_service();
        let auth = service.register(register_request("a@x.com", "Ada")).await.unwrap();
        service.logout(auth.user.id).await.unwrap();

        let found = service.get_user_by_name("Ada").await.unwrap();
        assert_eq!(found.id, auth.user.id);

        let missing = service.get_user_by_name("Nobody").await;
        assert!(matches!(
            missing,
            Err(ScribeError::NotFound { resource_type: "Author", .. })
        ));
    }

    #[tokio::test]
    async fn test_update_user_partial() {
        let context = test_context();
        let service = context.user_service();
        let auth = service.register(register_request("a@x.com", "Ada")).await.unwrap();

        let updated = service
            .update_user(
                auth.user.id,
                UpdateUserRequest {
                    name: Some("Ada L.".to_string()),
                    email: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ada L.");
        assert_eq!(updated.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_name_only_update_is_idempotent() {
        let context = test_context();
        let service = context.user_service();
        let auth = service.register(register_request("a@x.com", "Ada")).await.unwrap();
        let original = context.users.find_by_id(auth.user.id).await.unwrap().unwrap();

        let rename = || UpdateUserRequest {
            name: Some("Ada L.".to_string()),
            ..Default::default()
        };

        let first = service.update_user(auth.user.id, rename()).await.unwrap();
        let after_first = context.users.find_by_id(auth.user.id).await.unwrap().unwrap();

        let second = service.update_user(auth.user.id, rename()).await.unwrap();
        let after_second = context.users.find_by_id(auth.user.id).await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(after_first.name, "Ada L.");
        assert_eq!(after_first.email, original.email);
        assert_eq!(after_first.password_hash, original.password_hash);
        assert_eq!(after_second.password_hash, after_first.password_hash);
        assert_eq!(after_second.updated_at, after_first.updated_at);
        assert_eq!(after_second, after_first);

        assert!(service.login(login_request("a@x.com", "p")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_user_rejects_blank_name() {
        let service = test_context().user_service();
        let auth = service.register(register_request("a@x.com", "Ada")).await.unwrap();

        let result = service
            .update_user(
                auth.user.id,
                UpdateUserRequest {
                    name: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ScribeError::Validation(_))));
        assert_eq!(service.get_user(auth.user.id).await.unwrap().name, "Ada");
    }

    #[tokio::test]
    async fn test_update_user_password() {
        let service = test_context().user_service();
        let auth = service.register(register_request("a@x.com", "Ada")).await.unwrap();

        let mismatch = service
            .update_user(
                auth.user.id,
                UpdateUserRequest {
                    password: Some("new".to_string()),
                    password_confirmation: Some("other".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(mismatch, Err(ScribeError::PasswordMismatch)));

        service
            .update_user(
                auth.user.id,
                UpdateUserRequest {
                    password: Some("new".to_string()),
                    password_confirmation: Some("new".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            service.login(login_request("a@x.com", "p")).await,
            Err(ScribeError::WrongPassword)
        ));
        assert!(service.login(login_request("a@x.com", "new")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_user_email_taken() {
        let service = test_context().user_service();
        service.register(register_request("b@x.com", "Bob")).await.unwrap();
        let auth = service.register(register_request("a@x.com", "Ada")).await.unwrap();

        let result = service
            .update_user(
                auth.user.id,
                UpdateUserRequest {
                    name: Some("Renamed".to_string()),
                    email: Some("b@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ScribeError::AlreadyExists(_))));

        // nothing from the failed update was written
        let user = service.get_user(auth.user.id).await.unwrap();
        assert_eq!(user.name, "Ada");
    }

    #[tokio::test]
    async fn test_rename_refreshes_cached_articles() {
        let context = test_context();
        let users = context.user_service();
        let articles = context.article_service();
        let auth = users.register(register_request("a@x.com", "Ada")).await.unwrap();
        let created = articles
            .create_article(
                auth.user.id,
                CreateArticleRequest {
                    title: "T".to_string(),
                    content: "C".to_string(),
                },
            )
            .await
            .unwrap();

        // warm every cached read that embeds the author
        articles.get_all_articles().await.unwrap();
        articles.get_article(created.id).await.unwrap();
        articles.get_articles_by_author(auth.user.id).await.unwrap();

        users
            .update_user(
                auth.user.id,
                UpdateUserRequest {
                    name: Some("Ada L.".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let renamed = |article: &crate::dto::ArticleResponse| {
            article.author.as_ref().map(|a| a.name.as_str()) == Some("Ada L.")
        };
        assert!(renamed(&articles.get_all_articles().await.unwrap()[0]));
        assert!(renamed(&articles.get_article(created.id).await.unwrap()));
        assert!(renamed(&articles.get_articles_by_author(auth.user.id).await.unwrap()[0]));
    }

    #[tokio::test]
    async fn test_delete_account() {
        let context = test_context();
        let service = context.user_service();
        let auth = service.register(register_request("a@x.com", "Ada")).await.unwrap();

        service.delete_account(auth.user.id).await.unwrap();

        assert!(context.sessions.get(auth.user.id).await.unwrap().is_none());
        assert!(context.users.find_by_id(auth.user.id).await.unwrap().is_none());
        assert!(matches!(
            service.login(login_request("a@x.com", "p")).await,
            Err(ScribeError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_gated_operations_require_session() {
        let service = test_context().user_service();
        let stranger = UserId::new();

        assert!(matches!(service.get_user(stranger).await, Err(ScribeError::NotLoggedIn)));
        assert!(matches!(
            service.update_user(stranger, UpdateUserRequest::default()).await,
            Err(ScribeError::NotLoggedIn)
        ));
        assert!(matches!(service.delete_account(stranger).await, Err(ScribeError::NotLoggedIn)));
    }
}
