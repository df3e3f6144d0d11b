//! In-memory article repository.

use super::database::{MemoryState, PendingWrite};
use super::{MemoryDatabase, MemoryTransaction};
use crate::{traits::ArticleRepository, Transaction};
use async_trait::async_trait;
use chrono::Utc;
use scribe_core::{Article, ArticleId, NewArticle, ScribeResult, UserId};
use tracing::debug;

/// Article repository over a [`MemoryDatabase`].
#[derive(Clone, Debug)]
pub struct MemoryArticleRepository {
    db: MemoryDatabase,
}

impl MemoryArticleRepository {
    /// Creates a repository over `db`.
    #[must_use]
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }

    fn select(&self, predicate: impl Fn(&Article) -> bool) -> Vec<Article> {
        self.db.read(|state: &MemoryState| {
            state
                .articles
                .values()
                .filter(|a| !a.is_deleted() && predicate(a))
                .map(|a| state.joined(a))
                .collect()
        })
    }
}

/// Plain substring match over title and body.
fn matches_term(article: &Article, term: &str) -> bool {
    article.title.contains(term) || article.body.contains(term)
}

#[async_trait]
impl ArticleRepository for MemoryArticleRepository {
    async fn find_by_id(&self, id: ArticleId) -> ScribeResult<Option<Article>> {
        debug!("Finding article by id: {}", id);
        Ok(self
            .db
            .read(|state| state.live_article(id).map(|a| state.joined(a))))
    }

    async fn find_all(&self) -> ScribeResult<Vec<Article>> {
        debug!("Listing all articles");
        Ok(self.select(|_| true))
    }

    async fn find_by_author(&self, author_id: UserId) -> ScribeResult<Vec<Article>> {
        debug!("Listing articles by author: {}", author_id);
        Ok(self.select(|a| a.author_id == author_id))
    }

    async fn search(&self, term: &str) -> ScribeResult<Vec<Article>> {
        debug!("Searching articles for: {}", term);
        Ok(self.select(|a| matches_term(a, term)))
    }

    async fn search_by_author(&self, author_id: UserId, term: &str) -> ScribeResult<Vec<Article>> {
        debug!("Searching articles by {} for: {}", author_id, term);
        Ok(self.select(|a| a.author_id == author_id && matches_term(a, term)))
    }

    async fn create(&self, tx: &mut dyn Transaction, new_article: NewArticle) -> ScribeResult<Article> {
        let tx = MemoryTransaction::downcast(tx, &self.db)?;
        let article = Article::create(self.db.next_article_id(), new_article);
        debug!("Creating article: {}", article.id);

        tx.stage(PendingWrite::InsertArticle(article.clone()))?;
        Ok(article)
    }

    async fn update(&self, tx: &mut dyn Transaction, article: &Article) -> ScribeResult<Article> {
        let tx = MemoryTransaction::downcast(tx, &self.db)?;
        debug!("Updating article: {}", article.id);

        tx.stage(PendingWrite::UpdateArticle(article.clone()))?;
        Ok(article.clone())
    }

    async fn soft_delete(&self, tx: &mut dyn Transaction, id: ArticleId) -> ScribeResult<()> {
        let tx = MemoryTransaction::downcast(tx, &self.db)?;
        debug!("Soft-deleting article: {}", id);

        tx.stage(PendingWrite::SoftDeleteArticle(id, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{run_in_transaction, MemoryUserRepository, UserRepository};
    use scribe_core::{NewUser, ScribeError, User};

    struct Fixture {
        db: MemoryDatabase,
        users: MemoryUserRepository,
        articles: MemoryArticleRepository,
    }

    impl Fixture {
        fn new() -> Self {
            let db = MemoryDatabase::new();
            Self {
                users: MemoryUserRepository::new(db.clone()),
                articles: MemoryArticleRepository::new(db.clone()),
                db,
            }
        }

        async fn user(&self, name: &str) -> User {
            let users = self.users.clone();
            let new = NewUser {
                email: format!("{}@example.com", name.to_lowercase()),
                name: name.to_string(),
                password_hash: "hash".to_string(),
            };
            run_in_transaction(&self.db, move |tx| Box::pin(async move { users.create(tx, new).await }))
                .await
                .unwrap()
        }

        async fn article(&self, author: &User, title: &str, body: &str) -> Article {
            let articles = self.articles.clone();
            let new = NewArticle {
                title: title.to_string(),
                body: body.to_string(),
                author_id: author.id,
            };
            run_in_transaction(&self.db, move |tx| Box::pin(async move { articles.create(tx, new).await }))
                .await
                .unwrap()
        }

        async fn delete(&self, id: ArticleId) -> ScribeResult<()> {
            let articles = self.articles.clone();
            run_in_transaction(&self.db, move |tx| Box::pin(async move { articles.soft_delete(tx, id).await }))
                .await
        }
    }

    #[tokio::test]
    async fn test_reads_join_live_author() {
        let fx = Fixture::new();
        let ada = fx.user("Ada").await;
        let article = fx.article(&ada, "Engines", "Analytical").await;

        let found = fx.articles.find_by_id(article.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Engines");
        assert_eq!(found.author.as_ref().map(|u| u.name.as_str()), Some("Ada"));
    }

    #[tokio::test]
    async fn test_author_is_absent_once_deleted() {
        let fx = Fixture::new();
        let ada = fx.user("Ada").await;
        let article = fx.article(&ada, "Engines", "Analytical").await;

        let users = fx.users.clone();
        run_in_transaction(&fx.db, move |tx| Box::pin(async move { users.soft_delete(tx, ada.id).await }))
            .await
            .unwrap();

        let found = fx.articles.find_by_id(article.id).await.unwrap().unwrap();
        assert!(found.author.is_none());
    }

    #[tokio::test]
    async fn test_listing_is_ordered_and_filtered() {
        let fx = Fixture::new();
        let ada = fx.user("Ada").await;
        let bob = fx.user("Bob").await;
        let a1 = fx.article(&ada, "one", "x").await;
        let b1 = fx.article(&bob, "two", "y").await;
        let a2 = fx.article(&ada, "three", "z").await;

        let all: Vec<_> = fx.articles.find_all().await.unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(all, vec![a1.id, b1.id, a2.id]);

        let by_ada: Vec<_> = fx
            .articles
            .find_by_author(ada.id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(by_ada, vec![a1.id, a2.id]);
        assert!(fx.articles.find_by_author(UserId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_title_or_body() {
        let fx = Fixture::new();
        let ada = fx.user("Ada").await;
        let bob = fx.user("Bob").await;
        fx.article(&ada, "Rust ownership", "borrowing").await;
        fx.article(&bob, "Gardening", "tomatoes and rust fungus").await;
        fx.article(&bob, "Cooking", "pasta").await;

        assert_eq!(fx.articles.search("rust").await.unwrap().len(), 1);
        assert_eq!(fx.articles.search("Rust").await.unwrap().len(), 1);
        assert_eq!(fx.articles.search("o").await.unwrap().len(), 3);
        assert_eq!(fx.articles.search_by_author(bob.id, "o").await.unwrap().len(), 2);
        assert!(fx.articles.search_by_author(ada.id, "pasta").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_soft_deleted_article_is_hidden() {
        let fx = Fixture::new();
        let ada = fx.user("Ada").await;
        let article = fx.article(&ada, "Engines", "Analytical").await;

        fx.delete(article.id).await.unwrap();

        assert!(fx.articles.find_by_id(article.id).await.unwrap().is_none());
        assert!(fx.articles.find_all().await.unwrap().is_empty());
        assert!(fx.articles.search("Engines").await.unwrap().is_empty());

        let again = fx.delete(article.id).await;
        assert!(matches!(again, Err(ScribeError::NotFound { resource_type: "Article", .. })));
    }

    #[tokio::test]
    async fn test_update_changes_title_and_body() {
        let fx = Fixture::new();
        let ada = fx.user("Ada").await;
        let mut article = fx.article(&ada, "Draft", "text").await;

        assert!(article.apply_changes(Some("Final".to_string()), None));
        let articles = fx.articles.clone();
        let staged = article.clone();
        run_in_transaction(&fx.db, move |tx| Box::pin(async move { articles.update(tx, &staged).await }))
            .await
            .unwrap();

        let found = fx.articles.find_by_id(article.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Final");
        assert_eq!(found.body, "text");
    }

    #[tokio::test]
    async fn test_failed_work_rolls_back_every_write() {
        let fx = Fixture::new();
        let ada = fx.user("Ada").await;

        let articles = fx.articles.clone();
        let author = ada.id;
        let result: ScribeResult<()> = run_in_transaction(&fx.db, move |tx| {
            Box::pin(async move {
                articles
                    .create(
                        &mut *tx,
                        NewArticle {
                            title: "doomed".to_string(),
                            body: "never visible".to_string(),
                            author_id: author,
                        },
                    )
                    .await?;
                articles.soft_delete(&mut *tx, ArticleId(999)).await
            })
        })
        .await;

        assert!(result.is_err());
        assert!(fx.articles.find_all().await.unwrap().is_empty());
    }
}
