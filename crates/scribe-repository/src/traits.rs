//! Repository traits for the user and article stores.

use crate::Transaction;
use async_trait::async_trait;
use scribe_core::{Article, ArticleId, Interface, NewArticle, NewUser, ScribeResult, User, UserId};

/// Repository for user persistence.
///
/// Lookups never return soft-deleted users.
#[async_trait]
pub trait UserRepository: Interface + Send + Sync {
    /// Finds a live user by ID.
    async fn find_by_id(&self, id: UserId) -> ScribeResult<Option<User>>;

    /// Finds a live user by email address.
    async fn find_by_email(&self, email: &str) -> ScribeResult<Option<User>>;

    /// Finds the oldest live user carrying the given display name.
    async fn find_by_name(&self, name: &str) -> ScribeResult<Option<User>>;

    /// Checks whether a live user already holds the email address.
    async fn exists_by_email(&self, email: &str) -> ScribeResult<bool>;

    /// Stages a new user. The store assigns the ID and timestamps.
    async fn create(&self, tx: &mut dyn Transaction, new_user: NewUser) -> ScribeResult<User>;

    /// Stages a full overwrite of a live user's mutable fields.
    async fn update(&self, tx: &mut dyn Transaction, user: &User) -> ScribeResult<User>;

    /// Stages a soft delete. Fails with `NotFound` when no live user matches.
    async fn soft_delete(&self, tx: &mut dyn Transaction, id: UserId) -> ScribeResult<()>;
}

/// Repository for article persistence.
///
/// Every read excludes soft-deleted articles and joins the live author row.
/// Results are ordered by article ID.
#[async_trait]
pub trait ArticleRepository: Interface + Send + Sync {
    /// Finds a live article by ID.
    async fn find_by_id(&self, id: ArticleId) -> ScribeResult<Option<Article>>;

    /// Lists every live article.
    async fn find_all(&self) -> ScribeResult<Vec<Article>>;

    /// Lists the live articles of one author.
    async fn find_by_author(&self, author_id: UserId) -> ScribeResult<Vec<Article>>;

    /// Lists live articles whose title or body contains `term`.
    async fn search(&self, term: &str) -> ScribeResult<Vec<Article>>;

    /// Like [`search`](Self::search), restricted to one author.
    async fn search_by_author(&self, author_id: UserId, term: &str) -> ScribeResult<Vec<Article>>;

    /// Stages a new article. The store assigns the ID and timestamps.
    async fn create(&self, tx: &mut dyn Transaction, new_article: NewArticle) -> ScribeResult<Article>;

    /// Stages an overwrite of a live article's title, body and `updated_at`.
    async fn update(&self, tx: &mut dyn Transaction, article: &Article) -> ScribeResult<Article>;

    /// Stages a soft delete. Fails with `NotFound` when no live article matches.
    async fn soft_delete(&self, tx: &mut dyn Transaction, id: ArticleId) -> ScribeResult<()>;
}

