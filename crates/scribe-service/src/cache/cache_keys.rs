//! Cache key generators for consistent key naming.

use scribe_core::{ArticleId, UserId};

/// Prefix for all cache keys to namespace them.
const CACHE_PREFIX: &str = "scribe:cache";

/// Key for the list of every live article.
#[must_use]
pub fn all_articles() -> String {
    format!("{}:articles:all", CACHE_PREFIX)
}

/// Key for a single article.
#[must_use]
pub fn article_by_id(id: ArticleId) -> String {
    format!("{}:article:id:{}", CACHE_PREFIX, id)
}

/// Key for the article list of one author.
#[must_use]
pub fn articles_by_author(author_id: UserId) -> String {
    format!("{}:articles:author:{}", CACHE_PREFIX, author_id)
}

/// Keys made stale by creating an article.
#[must_use]
pub fn article_created_set() -> Vec<String> {
    vec![all_articles()]
}

/// Keys made stale by updating or deleting an article.
#[must_use]
pub fn article_changed_set(id: ArticleId, author_id: UserId) -> Vec<String> {
    vec![article_by_id(id), articles_by_author(author_id), all_articles()]
}

/// Keys that embed an author's projection: every list that can contain
/// their articles, plus each of those articles by id.
#[must_use]
pub fn author_changed_set(author_id: UserId, article_ids: impl IntoIterator<Item = ArticleId>) -> Vec<String> {
    let mut keys = vec![all_articles(), articles_by_author(author_id)];
    keys.extend(article_ids.into_iter().map(article_by_id));
    keys
}
