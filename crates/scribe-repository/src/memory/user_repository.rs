//! In-memory user repository.

use super::database::PendingWrite;
use super::{MemoryDatabase, MemoryTransaction};
use crate::{traits::UserRepository, Transaction};
use async_trait::async_trait;
use chrono::Utc;
use scribe_core::{NewUser, ScribeResult, User, UserId};
use tracing::debug;

/// User repository over a [`MemoryDatabase`].
#[derive(Clone, Debug)]
pub struct MemoryUserRepository {
    db: MemoryDatabase,
}

impl MemoryUserRepository {
    /// Creates a repository over `db`.
    #[must_use]
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }

    fn find_live(&self, predicate: impl Fn(&User) -> bool) -> Option<User> {
        self.db.read(|state| {
            state
                .users
                .values()
                .filter(|u| !u.is_deleted() && predicate(u))
                .min_by_key(|u| u.created_at)
                .cloned()
        })
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> ScribeResult<Option<User>> {
        debug!("Finding user by id: {}", id);
        Ok(self.db.read(|state| state.live_user(id).cloned()))
    }

    async fn find_by_email(&self, email: &str) -> ScribeResult<Option<User>> {
        debug!("Finding user by email: {}", email);
        Ok(self.find_live(|u| u.email == email))
    }

    async fn find_by_name(&self, name: &str) -> ScribeResult<Option<User>> {
        debug!("Finding user by name: {}", name);
        Ok(self.find_live(|u| u.name == name))
    }

    async fn exists_by_email(&self, email: &str) -> ScribeResult<bool> {
        Ok(self.find_live(|u| u.email == email).is_some())
    }

    async fn create(&self, tx: &mut dyn Transaction, new_user: NewUser) -> ScribeResult<User> {
        let tx = MemoryTransaction::downcast(tx, &self.db)?;
        let user = User::create(new_user);
        debug!("Creating user: {}", user.id);

        tx.stage(PendingWrite::InsertUser(user.clone()))?;
        Ok(user)
    }

    async fn update(&self, tx: &mut dyn Transaction, user: &User) -> ScribeResult<User> {
        let tx = MemoryTransaction::downcast(tx, &self.db)?;
        debug!("Updating user: {}", user.id);

        tx.stage(PendingWrite::UpdateUser(user.clone()))?;
        Ok(user.clone())
    }

    async fn soft_delete(&self, tx: &mut dyn Transaction, id: UserId) -> ScribeResult<()> {
        let tx = MemoryTransaction::downcast(tx, &self.db)?;
        debug!("Soft-deleting user: {}", id);

        tx.stage(PendingWrite::SoftDeleteUser(id, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{run_in_transaction, TransactionManager};
    use scribe_core::ScribeError;

    fn new_user(email: &str, name: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: name.to_string(),
            password_hash: "hashed_password".to_string(),
        }
    }

    async fn insert(db: &MemoryDatabase, repo: &MemoryUserRepository, email: &str, name: &str) -> User {
        let repo = repo.clone();
        let new = new_user(email, name);
        run_in_transaction(db, move |tx| Box::pin(async move { repo.create(tx, new).await }))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let db = MemoryDatabase::new();
        let repo = MemoryUserRepository::new(db.clone());

        let user = insert(&db, &repo, "ada@example.com", "Ada").await;

        let by_id = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ada@example.com");
        assert_eq!(repo.find_by_email("ada@example.com").await.unwrap().unwrap().id, user.id);
        assert_eq!(repo.find_by_name("Ada").await.unwrap().unwrap().id, user.id);
        assert!(repo.exists_by_email("ada@example.com").await.unwrap());
        assert!(!repo.exists_by_email("bob@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_name_prefers_oldest() {
        let db = MemoryDatabase::new();
        let repo = MemoryUserRepository::new(db.clone());

        let first = insert(&db, &repo, "one@example.com", "Sam").await;
        let _second = insert(&db, &repo, "two@example.com", "Sam").await;

        assert_eq!(repo.find_by_name("Sam").await.unwrap().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_soft_deleted_user_is_hidden() {
        let db = MemoryDatabase::new();
        let repo = MemoryUserRepository::new(db.clone());
        let user = insert(&db, &repo, "ada@example.com", "Ada").await;

        let deleter = repo.clone();
        run_in_transaction(&db, move |tx| Box::pin(async move { deleter.soft_delete(tx, user.id).await }))
            .await
            .unwrap();

        assert!(repo.find_by_id(user.id).await.unwrap().is_none());
        assert!(repo.find_by_email("ada@example.com").await.unwrap().is_none());
        assert!(!repo.exists_by_email("ada@example.com").await.unwrap());
        // the row itself is kept
        assert!(db.read(|s| s.users.get(&user.id).is_some_and(User::is_deleted)));
    }

    #[tokio::test]
    async fn test_update_missing_user_fails() {
        let db = MemoryDatabase::new();
        let repo = MemoryUserRepository::new(db.clone());
        let ghost = User::create(new_user("ghost@example.com", "Ghost"));

        let result = run_in_transaction(&db, move |tx| {
            Box::pin(async move { repo.update(tx, &ghost).await })
        })
        .await;

        assert!(matches!(result, Err(ScribeError::NotFound { resource_type: "User", .. })));
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let db = MemoryDatabase::new();
        let repo = MemoryUserRepository::new(db.clone());
        let mut user = insert(&db, &repo, "ada@example.com", "Ada").await;

        user.change_name("Ada L.".to_string());
        user.change_email("lovelace@example.com".to_string());
        let updater = repo.clone();
        let staged = user.clone();
        run_in_transaction(&db, move |tx| Box::pin(async move { updater.update(tx, &staged).await }))
            .await
            .unwrap();

        let found = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Ada L.");
        assert_eq!(found.email, "lovelace@example.com");
    }

    #[tokio::test]
    async fn test_uncommitted_create_is_invisible() {
        let db = MemoryDatabase::new();
        let repo = MemoryUserRepository::new(db.clone());

        let mut tx = db.begin().await.unwrap();
        let user = repo
            .create(tx.as_mut(), new_user("ada@example.com", "Ada"))
            .await
            .unwrap();
        assert!(repo.find_by_id(user.id).await.unwrap().is_none());

        tx.rollback().await.unwrap();
        assert!(repo.find_by_id(user.id).await.unwrap().is_none());
    }
}
