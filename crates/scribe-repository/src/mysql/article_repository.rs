//! MySQL article repository implementation.

use super::MySqlTransaction;
use crate::{traits::ArticleRepository, DatabasePoolInterface, Transaction};
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use scribe_core::{Article, ArticleId, NewArticle, ScribeError, ScribeResult, User, UserId};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Live articles joined with their live author.
const SELECT_ARTICLES: &str = r#"
    SELECT a.id, a.title, a.body, a.author_id, a.created_at, a.updated_at, a.deleted_at,
           u.id AS author_row_id, u.email AS author_email, u.name AS author_name,
           u.password_hash AS author_password_hash,
           u.created_at AS author_created_at, u.updated_at AS author_updated_at
    FROM articles a
    LEFT JOIN users u ON u.id = a.author_id AND u.deleted_at IS NULL
    WHERE a.deleted_at IS NULL
"#;

/// MySQL article repository implementation.
#[derive(Clone)]
pub struct MySqlArticleRepository {
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlArticleRepository {
    /// Creates a new MySQL article repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }

    async fn fetch_many(&self, filter: &str, binds: &[&str]) -> ScribeResult<Vec<Article>> {
        let sql = format!("{SELECT_ARTICLES} {filter} ORDER BY a.id");
        let mut query = sqlx::query_as::<_, ArticleRow>(&sql);
        for value in binds {
            query = query.bind(*value);
        }

        let rows = query.fetch_all(self.pool.inner()).await?;
        rows.into_iter().map(Article::try_from).collect()
    }
}

/// Database row representation of an article with its joined author.
#[derive(Debug, FromRow)]
struct ArticleRow {
    id: i64,
    title: String,
    body: String,
    author_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    author_row_id: Option<String>,
    author_email: Option<String>,
    author_name: Option<String>,
    author_password_hash: Option<String>,
    author_created_at: Option<DateTime<Utc>>,
    author_updated_at: Option<DateTime<Utc>>,
}

fn parse_user_id(raw: &str) -> ScribeResult<UserId> {
    Uuid::parse_str(raw)
        .map(UserId::from_uuid)
        .map_err(|e| ScribeError::Internal(format!("Invalid UUID in database: {}", e)))
}

impl TryFrom<ArticleRow> for Article {
    type Error = ScribeError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        let author = match (
            row.author_row_id,
            row.author_email,
            row.author_name,
            row.author_password_hash,
            row.author_created_at,
            row.author_updated_at,
        ) {
            (Some(id), Some(email), Some(name), Some(password_hash), Some(created_at), Some(updated_at)) => {
                Some(User {
                    id: parse_user_id(&id)?,
                    email,
                    name,
                    password_hash,
                    created_at,
                    updated_at,
                    deleted_at: None,
                })
            }
            _ => None,
        };

        Ok(Article {
            id: ArticleId(row.id),
            title: row.title,
            body: row.body,
            author_id: parse_user_id(&row.author_id)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
            author,
        })
    }
}

#[async_trait]
impl ArticleRepository for MySqlArticleRepository {
    async fn find_by_id(&self, id: ArticleId) -> ScribeResult<Option<Article>> {
        debug!("Finding article by id: {}", id);

        let sql = format!("{SELECT_ARTICLES} AND a.id = ?");
        let row = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(id.into_inner())
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(Article::try_from).transpose()
    }

    async fn find_all(&self) -> ScribeResult<Vec<Article>> {
        debug!("Listing all articles");
        self.fetch_many("", &[]).await
    }

    async fn find_by_author(&self, author_id: UserId) -> ScribeResult<Vec<Article>> {
        debug!("Listing articles by author: {}", author_id);
        let author = author_id.to_string();
        self.fetch_many("AND a.author_id = ?", &[author.as_str()]).await
    }

    async fn search(&self, term: &str) -> ScribeResult<Vec<Article>> {
        debug!("Searching articles for: {}", term);
        let pattern = like_pattern(term);
        self.fetch_many("AND (a.title LIKE ? OR a.body LIKE ?)", &[pattern.as_str(), pattern.as_str()])
            .await
    }

    async fn search_by_author(&self, author_id: UserId, term: &str) -> ScribeResult<Vec<Article>> {
        debug!("Searching articles by {} for: {}", author_id, term);
        let author = author_id.to_string();
        let pattern = like_pattern(term);
        self.fetch_many(
            "AND a.author_id = ? AND (a.title LIKE ? OR a.body LIKE ?)",
            &[author.as_str(), pattern.as_str(), pattern.as_str()],
        )
        .await
    }

    async fn create(&self, tx: &mut dyn Transaction, new_article: NewArticle) -> ScribeResult<Article> {
        let tx = MySqlTransaction::downcast(tx)?;
        debug!("Creating article for author: {}", new_article.author_id);

        // DATETIME(6) keeps microseconds
        let now = Utc::now().trunc_subsecs(6);
        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, body, author_id, created_at, updated_at, deleted_at)
            VALUES (?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&new_article.title)
        .bind(&new_article.body)
        .bind(new_article.author_id.to_string())
        .bind(now)
        .bind(now)
        .execute(tx.connection())
        .await?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|_| ScribeError::internal("Article id out of range"))?;

        let mut article = Article::create(ArticleId(id), new_article);
        article.created_at = now;
        article.updated_at = now;
        Ok(article)
    }

    async fn update(&self, tx: &mut dyn Transaction, article: &Article) -> ScribeResult<Article> {
        let tx = MySqlTransaction::downcast(tx)?;
        debug!("Updating article: {}", article.id);

        let result = sqlx::query(
            "UPDATE articles SET title = ?, body = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&article.title)
        .bind(&article.body)
        .bind(article.updated_at)
        .bind(article.id.into_inner())
        .execute(tx.connection())
        .await?;

        // MySQL reports changed rows, so an identical overwrite reads as zero.
        if result.rows_affected() == 0 {
            let live = sqlx::query_scalar::<_, i64>(
                "SELECT 1 FROM articles WHERE id = ? AND deleted_at IS NULL",
            )
            .bind(article.id.into_inner())
            .fetch_optional(tx.connection())
            .await?;
            if live.is_none() {
                return Err(ScribeError::not_found("Article", article.id));
            }
        }

        Ok(article.clone())
    }

    async fn soft_delete(&self, tx: &mut dyn Transaction, id: ArticleId) -> ScribeResult<()> {
        let tx = MySqlTransaction::downcast(tx)?;
        debug!("Soft-deleting article: {}", id);

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE articles SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(id.into_inner())
        .execute(tx.connection())
        .await?;

        if result.rows_affected() == 0 {
            return Err(ScribeError::not_found("Article", id));
        }
        Ok(())
    }
}

/// Builds a `LIKE` pattern matching `term` anywhere, with wildcards escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl std::fmt::Debug for MySqlArticleRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlArticleRepository").finish_non_exhaustive()
    }
}
