//! Article service trait definition.

use crate::dto::{ArticleQuery, ArticleResponse, CreateArticleRequest, UpdateArticleRequest};
use async_trait::async_trait;
use scribe_core::{ArticleId, Interface, ScribeResult, UserId};

/// Article use-cases.
///
/// Listing and single reads are served read-through from the cache;
/// searches always go to the store.
#[async_trait]
pub trait ArticleService: Interface + Send + Sync {
    /// Publishes an article for the acting author.
    async fn create_article(&self, author_id: UserId, request: CreateArticleRequest) -> ScribeResult<ArticleResponse>;

    /// Lists every live article.
    async fn get_all_articles(&self) -> ScribeResult<Vec<ArticleResponse>>;

    /// Returns one article.
    async fn get_article(&self, id: ArticleId) -> ScribeResult<ArticleResponse>;

    /// Lists one author's articles.
    async fn get_articles_by_author(&self, author_id: UserId) -> ScribeResult<Vec<ArticleResponse>>;

    /// Searches title and content.
    async fn search_articles(&self, query: &str) -> ScribeResult<Vec<ArticleResponse>>;

    /// Searches title and content within one author's articles.
    async fn search_articles_by_author(&self, author_id: UserId, query: &str) -> ScribeResult<Vec<ArticleResponse>>;

    /// Dispatches a listing request on its author and search filters.
    async fn find_articles(&self, query: ArticleQuery) -> ScribeResult<Vec<ArticleResponse>>;

    /// Edits an article owned by the acting user.
    async fn update_article(
        &self,
        user_id: UserId,
        id: ArticleId,
        request: UpdateArticleRequest,
    ) -> ScribeResult<ArticleResponse>;

    /// Soft-deletes an article owned by the acting user.
    async fn delete_article(&self, user_id: UserId, id: ArticleId) -> ScribeResult<()>;
}
