//! In-process session directory.

use super::SessionDirectory;
use async_trait::async_trait;
use parking_lot::RwLock;
use scribe_core::{ScribeResult, UserId};
use std::collections::HashMap;

/// Session directory held in a process-local map.
#[derive(Debug, Default)]
pub struct MemorySessionDirectory {
    sessions: RwLock<HashMap<UserId, String>>,
}

impl MemorySessionDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionDirectory for MemorySessionDirectory {
    async fn get(&self, user_id: UserId) -> ScribeResult<Option<String>> {
        Ok(self.sessions.read().get(&user_id).cloned())
    }

    async fn set(&self, user_id: UserId, token: &str) -> ScribeResult<()> {
        self.sessions.write().insert(user_id, token.to_string());
        Ok(())
    }

    async fn delete(&self, user_id: UserId) -> ScribeResult<()> {
        self.sessions.write().remove(&user_id);
        Ok(())
    }
}
