//! JWT token provider for issuing and validating session tokens.

use super::Claims;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use scribe_config::SecurityConfig;
use scribe_core::{Interface, ScribeError, ScribeResult, UserId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Upper bound on token lifetime (ten years).
const MAX_LIFETIME_SECS: u64 = 10 * 365 * 24 * 3600;

/// Interface for session token operations.
pub trait TokenProviderInterface: Interface + Send + Sync {
    /// Issues a signed session token for a user.
    fn issue(&self, user_id: UserId) -> ScribeResult<String>;

    /// Validates a token and returns its claims.
    fn validate(&self, token: &str) -> ScribeResult<Claims>;
}

/// JWT token provider service.
#[derive(Clone)]
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: Arc<SecurityConfig>,
    validation: Validation,
}

impl TokenProvider {
    /// Creates a new token provider.
    #[must_use]
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_audience(&[&config.jwt_audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Self {
            encoding_key,
            decoding_key,
            config,
            validation,
        }
    }

    fn expiration(&self) -> Duration {
        let secs = self.config.jwt_expiration_secs.min(MAX_LIFETIME_SECS);
        Duration::seconds(i64::try_from(secs).unwrap_or_default())
    }
}

impl TokenProviderInterface for TokenProvider {
    fn issue(&self, user_id: UserId) -> ScribeResult<String> {
        let expires_at = Utc::now() + self.expiration();

        let claims = Claims::new_session(
            user_id,
            self.config.jwt_issuer.clone(),
            self.config.jwt_audience.clone(),
            expires_at,
        );

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ScribeError::Internal(format!("Failed to generate session token: {}", e)))?;

        debug!("Issued session token for user {}", user_id);
        Ok(token)
    }

    fn validate(&self, token: &str) -> ScribeResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                warn!("Token validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => ScribeError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidToken
                    | jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        ScribeError::InvalidToken("Invalid token signature".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                        ScribeError::InvalidToken("Invalid token issuer".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                        ScribeError::InvalidToken("Invalid token audience".to_string())
                    }
                    _ => ScribeError::InvalidToken(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("issuer", &self.config.jwt_issuer)
            .field("audience", &self.config.jwt_audience)
            .finish_non_exhaustive()
    }
}
