//! Unified error types for all layers of the application.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for all layers of Scribe.
///
/// The first two groups form the taxonomy callers branch on; they are
/// returned untranslated from the use-case layer. Infrastructure variants
/// carry the backend's own message.
#[derive(Error, Debug)]
pub enum ScribeError {
    // ============ Authorization Errors ============
    /// The acting user has no live session record.
    #[error("User is not logged in")]
    NotLoggedIn,

    /// The acting user does not own the entity.
    #[error("Not allowed: {0}")]
    NotAllowed(String),

    /// Invalid token
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token expired
    #[error("Token expired")]
    TokenExpired,

    // ============ Domain Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Unique field already taken (e.g., email)
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Password and its confirmation differ
    #[error("Password and confirmation do not match")]
    PasswordMismatch,

    /// Password did not verify against the stored credential
    #[error("Wrong password")]
    WrongPassword,

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    // ============ Infrastructure Errors ============
    /// Cache backend unreachable while serving a read
    #[error("Read failure: {0}")]
    ReadFailure(String),

    /// Entity store error
    #[error("Store error: {0}")]
    Store(String),

    /// Session directory backend error
    #[error("Session store error: {0}")]
    Session(String),

    /// Redis/Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScribeError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) | Self::PasswordMismatch => 400,
            Self::AlreadyExists(_) => 409,
            Self::NotLoggedIn | Self::WrongPassword | Self::InvalidToken(_) | Self::TokenExpired => 401,
            Self::NotAllowed(_) => 403,
            Self::ReadFailure(_)
            | Self::Store(_)
            | Self::Session(_)
            | Self::Cache(_)
            | Self::Configuration(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotLoggedIn => "NOT_LOGGED_IN",
            Self::NotAllowed(_) => "NOT_ALLOWED",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::WrongPassword => "WRONG_PASSWORD",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ReadFailure(_) => "READ_FAILURE",
            Self::Store(_) => "STORE_ERROR",
            Self::Session(_) => "SESSION_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates an ownership violation error.
    #[must_use]
    pub fn not_allowed<T: Into<String>>(message: T) -> Self {
        Self::NotAllowed(message.into())
    }

    /// Creates an already-exists error.
    #[must_use]
    pub fn already_exists<T: Into<String>>(message: T) -> Self {
        Self::AlreadyExists(message.into())
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an entity store error.
    #[must_use]
    pub fn store<T: Into<String>>(message: T) -> Self {
        Self::Store(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true for the not-found variant, regardless of resource.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Checks if this error is retriable.
    ///
    /// Nothing inside the workspace retries; this is a hint for the
    /// transport layer.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::ReadFailure(_) | Self::Session(_) | Self::Cache(_)
        )
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for ScribeError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => {
                // PostgreSQL / MySQL unique violation
                if db_err.is_unique_violation()
                    || matches!(db_err.code().as_deref(), Some("23505" | "1062"))
                {
                    return Self::AlreadyExists(db_err.message().to_string());
                }
                Self::Store(err.to_string())
            }
            _ => Self::Store(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ScribeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`; lets clients branch on one flag for both envelopes.
    pub status: bool,
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level errors for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
    /// Request trace ID for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Field-level validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `ScribeError`.
    #[must_use]
    pub fn from_error(error: &ScribeError) -> Self {
        Self {
            status: false,
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: None,
            trace_id: None,
        }
    }

    /// Sets the trace ID.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Sets field-level validation errors.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&ScribeError> for ErrorResponse {
    fn from(error: &ScribeError) -> Self {
        Self::from_error(error)
    }
}
