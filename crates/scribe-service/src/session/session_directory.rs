//! Session directory trait.

use async_trait::async_trait;
use scribe_core::{Interface, ScribeResult, UserId};

/// Prefix for session keys.
const SESSION_PREFIX: &str = "scribe:session";

/// Key under which a user's session token is stored.
#[must_use]
pub fn session_key(user_id: UserId) -> String {
    format!("{}:{}", SESSION_PREFIX, user_id)
}

/// Maps a user to their live session token.
///
/// Backend failures surface as `ScribeError::Session`.
#[async_trait]
pub trait SessionDirectory: Interface + Send + Sync {
    /// Returns the user's token, if a session exists.
    async fn get(&self, user_id: UserId) -> ScribeResult<Option<String>>;

    /// Stores the user's token without expiry, replacing any previous one.
    async fn set(&self, user_id: UserId, token: &str) -> ScribeResult<()>;

    /// Removes the user's session. Removing a missing session is not an error.
    async fn delete(&self, user_id: UserId) -> ScribeResult<()>;
}
