//! MySQL user repository implementation.

use super::MySqlTransaction;
use crate::{traits::UserRepository, DatabasePoolInterface, Transaction};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scribe_core::{NewUser, ScribeError, ScribeResult, User, UserId};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// MySQL user repository implementation.
#[derive(Clone)]
pub struct MySqlUserRepository {
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlUserRepository {
    /// Creates a new MySQL user repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user.
#[derive(Debug, FromRow)]
struct UserRow {
    id: String, // CHAR(36)
    email: String,
    name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = ScribeError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| ScribeError::Internal(format!("Invalid UUID in database: {}", e)))?;

        Ok(User {
            id: UserId::from_uuid(id),
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: UserId) -> ScribeResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, password_hash, created_at, updated_at, deleted_at
            FROM users
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> ScribeResult<Option<User>> {
        debug!("Finding user by email: {}", email);

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, password_hash, created_at, updated_at, deleted_at
            FROM users
            WHERE email = ? AND deleted_at IS NULL
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_name(&self, name: &str) -> ScribeResult<Option<User>> {
        debug!("Finding user by name: {}", name);

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, password_hash, created_at, updated_at, deleted_at
            FROM users
            WHERE name = ? AND deleted_at IS NULL
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn exists_by_email(&self, email: &str) -> ScribeResult<bool> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM users WHERE email = ? AND deleted_at IS NULL LIMIT 1",
        )
        .bind(email)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(exists.is_some())
    }

    async fn create(&self, tx: &mut dyn Transaction, new_user: NewUser) -> ScribeResult<User> {
        let tx = MySqlTransaction::downcast(tx)?;
        let user = User::create(new_user);
        debug!("Creating user: {}", user.id);

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, created_at, updated_at, deleted_at)
            VALUES (?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(tx.connection())
        .await?;

        Ok(user)
    }

    async fn update(&self, tx: &mut dyn Transaction, user: &User) -> ScribeResult<User> {
        let tx = MySqlTransaction::downcast(tx)?;
        debug!("Updating user: {}", user.id);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = ?, name = ?, password_hash = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.updated_at)
        .bind(user.id.to_string())
        .execute(tx.connection())
        .await?;

        // MySQL reports changed rows, so an identical overwrite reads as zero.
        if result.rows_affected() == 0 {
            let live = sqlx::query_scalar::<_, i64>(
                "SELECT 1 FROM users WHERE id = ? AND deleted_at IS NULL",
            )
            .bind(user.id.to_string())
            .fetch_optional(tx.connection())
            .await?;
            if live.is_none() {
                return Err(ScribeError::not_found("User", user.id));
            }
        }

        Ok(user.clone())
    }

    async fn soft_delete(&self, tx: &mut dyn Transaction, id: UserId) -> ScribeResult<()> {
        let tx = MySqlTransaction::downcast(tx)?;
        debug!("Soft-deleting user: {}", id);

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE users SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(id.to_string())
        .execute(tx.connection())
        .await?;

        if result.rows_affected() == 0 {
            return Err(ScribeError::not_found("User", id));
        }
        Ok(())
    }
}

impl std::fmt::Debug for MySqlUserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlUserRepository").finish_non_exhaustive()
    }
}
