//! JWT claims structure.

use chrono::{DateTime, Utc};
use scribe_core::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,

    /// Issued at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,

    /// Not before timestamp.
    pub nbf: i64,

    /// Issuer.
    pub iss: String,

    /// Audience.
    pub aud: String,

    /// JWT ID; makes every issued token distinct.
    pub jti: String,
}

impl Claims {
    /// Creates session claims for a user.
    #[must_use]
    pub fn new_session(
        user_id: UserId,
        issuer: String,
        audience: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            nbf: now.timestamp(),
            iss: issuer,
            aud: audience,
            jti: Uuid::now_v7().to_string(),
        }
    }

    /// Returns the user ID, if the subject is a well-formed UUID.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        UserId::parse(&self.sub).ok()
    }

    /// Checks if the token is expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Returns the expiration time.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_session_claims() {
        let user_id = UserId::new();
        let expires = Utc::now() + Duration::hours(1);
        let claims = Claims::new_session(user_id, "issuer".to_string(), "audience".to_string(), expires);

        assert_eq!(claims.user_id(), Some(user_id));
        assert!(!claims.is_expired());
        assert_eq!(claims.expires_at().timestamp(), expires.timestamp());
    }

    #[test]
    fn test_malformed_subject() {
        let mut claims = Claims::new_session(
            UserId::new(),
            "issuer".to_string(),
            "audience".to_string(),
            Utc::now(),
        );
        claims.sub = "someone".to_string();
        assert!(claims.user_id().is_none());
    }
}
