//! Authorization gate: session membership and ownership checks.

use crate::session::SessionDirectory;
use scribe_core::{Owned, ScribeError, ScribeResult, UserId};
use std::sync::Arc;
use tracing::debug;

/// Checks run before any gated operation touches the store.
#[derive(Clone)]
pub struct AuthorizationGate {
    sessions: Arc<dyn SessionDirectory>,
}

impl AuthorizationGate {
    /// Creates a gate over the session directory.
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionDirectory>) -> Self {
        Self { sessions }
    }

    /// Fails with `NotLoggedIn` unless `user_id` has a session record.
    ///
    /// A failing directory surfaces as `Session`, never as a pass.
    pub async fn require_session(&self, user_id: UserId) -> ScribeResult<()> {
        let token = self.sessions.get(user_id).await.map_err(|e| match e {
            ScribeError::Session(_) => e,
            other => ScribeError::Session(other.to_string()),
        })?;

        match token {
            Some(_) => Ok(()),
            None => {
                debug!("No session for user {}", user_id);
                Err(ScribeError::NotLoggedIn)
            }
        }
    }

    /// Fails with `NotAllowed` unless `acting_user` owns `entity`.
    pub fn require_ownership<T: Owned>(&self, entity: &T, acting_user: UserId) -> ScribeResult<()> {
        if entity.owner_id() == acting_user {
            Ok(())
        } else {
            debug!("User {} does not own the target entity", acting_user);
            Err(ScribeError::not_allowed("only the owner may modify this resource"))
        }
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionDirectory;
    use async_trait::async_trait;

    struct Document {
        owner: UserId,
    }

    impl Owned for Document {
        fn owner_id(&self) -> UserId {
            self.owner
        }
    }

    struct UnreachableDirectory;

    #[async_trait]
    impl SessionDirectory for UnreachableDirectory {
        async fn get(&self, _user_id: UserId) -> ScribeResult<Option<String>> {
            Err(ScribeError::Internal("connection refused".to_string()))
        }

        async fn set(&self, _user_id: UserId, _token: &str) -> ScribeResult<()> {
            Err(ScribeError::Session("connection refused".to_string()))
        }

        async fn delete(&self, _user_id: UserId) -> ScribeResult<()> {
            Err(ScribeError::Session("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_require_session() {
        let sessions = Arc::new(MemorySessionDirectory::new());
        let gate = AuthorizationGate::new(sessions.clone());
        let user = UserId::new();

        assert!(matches!(gate.require_session(user).await, Err(ScribeError::NotLoggedIn)));
        sessions.set(user, "token").await.unwrap();
        assert!(gate.require_session(user).await.is_ok());
    }

    #[tokio::test]
    async fn test_directory_failure_is_not_a_pass() {
        let gate = AuthorizationGate::new(Arc::new(UnreachableDirectory));
        let result = gate.require_session(UserId::new()).await;
        assert!(matches!(result, Err(ScribeError::Session(_))));
    }

    #[test]
    fn test_require_ownership() {
        let gate = AuthorizationGate::new(Arc::new(MemorySessionDirectory::new()));
        let owner = UserId::new();
        let doc = Document { owner };

        assert!(gate.require_ownership(&doc, owner).is_ok());
        assert!(matches!(
            gate.require_ownership(&doc, UserId::new()),
            Err(ScribeError::NotAllowed(_))
        ));
    }
}
