//! Article entity.

use crate::{ArticleId, Entity, Owned, User, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A blog article owned by its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Store-assigned numeric identifier.
    pub id: ArticleId,

    pub title: String,

    pub body: String,

    /// Owning author.
    pub author_id: UserId,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Author row joined on read; `None` when the author is gone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
}

impl Article {
    /// Materialises a freshly created article with a store-assigned id.
    #[must_use]
    pub fn create(id: ArticleId, new_article: NewArticle) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: new_article.title,
            body: new_article.body,
            author_id: new_article.author_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            author: None,
        }
    }

    /// Applies a partial edit. Absent or empty fields are left untouched.
    ///
    /// Returns true when at least one field changed.
    pub fn apply_changes(&mut self, title: Option<String>, body: Option<String>) -> bool {
        let mut changed = false;
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            self.title = title;
            changed = true;
        }
        if let Some(body) = body.filter(|b| !b.is_empty()) {
            self.body = body;
            changed = true;
        }
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Attaches the joined author row.
    #[must_use]
    pub fn with_author(mut self, author: Option<User>) -> Self {
        self.author = author;
        self
    }

    /// Returns true once the article has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Entity<ArticleId> for Article {
    fn id(&self) -> &ArticleId {
        &self.id
    }
}

impl Owned for Article {
    fn owner_id(&self) -> UserId {
        self.author_id
    }
}

/// Fields a caller supplies when publishing an article.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub body: String,
    pub author_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article::create(
            ArticleId(1),
            NewArticle {
                title: "T".to_string(),
                body: "C".to_string(),
                author_id: UserId::new(),
            },
        )
    }

    #[test]
    fn test_apply_changes_skips_empty_fields() {
        let mut a = article();
        assert!(!a.apply_changes(None, Some(String::new())));
        assert_eq!(a.title, "T");
        assert_eq!(a.body, "C");

        assert!(a.apply_changes(Some("T2".to_string()), None));
        assert_eq!(a.title, "T2");
        assert_eq!(a.body, "C");
    }

    #[test]
    fn test_owner_is_author() {
        let a = article();
        assert_eq!(a.owner_id(), a.author_id);
        assert_eq!(*a.id(), ArticleId(1));
    }
}
