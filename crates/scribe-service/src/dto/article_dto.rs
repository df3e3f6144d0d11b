//! Article-related DTOs.

use super::UserResponse;
use chrono::{DateTime, SecondsFormat, Utc};
use scribe_core::rules::not_blank;
use scribe_core::{Article, ArticleId, UserId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create an article.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,

    #[validate(custom(function = "not_blank", message = "Content is required"))]
    pub content: String,
}

/// Partial article edit. Absent or empty fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Filters accepted by the article listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleQuery {
    /// Display name of the author to restrict to.
    pub author: Option<String>,
    /// Substring to search title and content for.
    #[serde(rename = "query")]
    pub search: Option<String>,
}

impl ArticleQuery {
    pub(crate) fn author(&self) -> Option<&str> {
        self.author.as_deref().filter(|a| !a.is_empty())
    }

    pub(crate) fn search(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }
}

/// Public article projection, as cached and returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub id: ArticleId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    /// `null` when the author account is gone.
    pub author: Option<UserResponse>,
    /// RFC 3339.
    pub created_at: String,
    /// RFC 3339.
    pub updated_at: String,
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            content: article.body,
            author_id: article.author_id,
            author: article.author.map(UserResponse::from),
            created_at: rfc3339(article.created_at),
            updated_at: rfc3339(article.updated_at),
        }
    }
}
