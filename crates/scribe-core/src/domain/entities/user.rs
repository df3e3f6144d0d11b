//! User entity.

use crate::{Entity, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,

    /// Unique email address.
    pub email: String,

    /// Display name.
    pub name: String,

    /// Argon2 PHC string (never exposed via API).
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Materialises a freshly created user. Only the entity store calls this;
    /// identity and timestamps are never taken from the caller.
    #[must_use]
    pub fn create(new_user: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email: new_user.email,
            name: new_user.name,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns true once the account has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Changes the display name.
    pub fn change_name(&mut self, name: String) {
        self.name = name;
        self.updated_at = Utc::now();
    }

    /// Changes the email address. Uniqueness is the caller's concern.
    pub fn change_email(&mut self, email: String) {
        self.email = email;
        self.updated_at = Utc::now();
    }

    /// Updates the user's password hash.
    pub fn update_password(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }

    /// Marks the user as deleted.
    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}

impl Entity<UserId> for User {
    fn id(&self) -> &UserId {
        &self.id
    }
}

/// Fields a caller supplies when registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}
