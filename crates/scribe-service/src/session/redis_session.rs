//! Redis-backed session directory.

use super::{session_key, SessionDirectory};
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Pool};
use scribe_core::{ScribeError, ScribeResult, UserId};
use std::sync::Arc;
use tracing::debug;

/// Session directory stored in Redis as plain keys without TTL.
#[derive(Clone)]
pub struct RedisSessionDirectory {
    pool: Arc<Pool>,
}

impl RedisSessionDirectory {
    /// Creates a session directory on the shared pool.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool }
    }

    async fn get_conn(&self) -> ScribeResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| ScribeError::Session(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl SessionDirectory for RedisSessionDirectory {
    async fn get(&self, user_id: UserId) -> ScribeResult<Option<String>> {
        let mut conn = self.get_conn().await?;
        let token: Option<String> = conn
            .get(session_key(user_id))
            .await
            .map_err(|e| ScribeError::Session(format!("Failed to read session: {}", e)))?;
        Ok(token)
    }

    async fn set(&self, user_id: UserId, token: &str) -> ScribeResult<()> {
        let mut conn = self.get_conn().await?;
        conn.set::<_, _, ()>(session_key(user_id), token)
            .await
            .map_err(|e| ScribeError::Session(format!("Failed to store session: {}", e)))?;
        debug!("Session stored for user {}", user_id);
        Ok(())
    }

    async fn delete(&self, user_id: UserId) -> ScribeResult<()> {
        let mut conn = self.get_conn().await?;
        conn.del::<_, ()>(session_key(user_id))
            .await
            .map_err(|e| ScribeError::Session(format!("Failed to delete session: {}", e)))?;
        debug!("Session removed for user {}", user_id);
        Ok(())
    }
}

impl std::fmt::Debug for RedisSessionDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionDirectory").finish_non_exhaustive()
    }
}
