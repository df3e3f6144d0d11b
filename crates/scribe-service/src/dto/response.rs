//! Success envelope.

use serde::{Deserialize, Serialize};

/// Success envelope mirroring `ErrorResponse`: `status` is always `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Wraps a payload.
    #[must_use]
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// A success without payload.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::{ErrorResponse, ScribeError};

    #[test]
    fn test_envelopes_share_status_flag() {
        let ok = serde_json::to_value(ApiResponse::ok("Success get article", 5)).unwrap();
        assert_eq!(ok["status"], true);
        assert_eq!(ok["data"], 5);

        let empty = serde_json::to_value(ApiResponse::message("Success logout")).unwrap();
        assert!(empty.get("data").is_none());

        let err = serde_json::to_value(ErrorResponse::from_error(&ScribeError::NotLoggedIn)).unwrap();
        assert_eq!(err["status"], false);
        assert_eq!(err["code"], "NOT_LOGGED_IN");
    }
}
