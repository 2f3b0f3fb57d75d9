//! Error types for the AI School API client.
//!
//! # Design
//! One variant per failure the UI reacts to differently. `Unauthorized` is
//! the caller's cue to clear the session; the client itself never does.
//! Status-bearing variants keep the HTTP status for display and for the FFI
//! result, using `0` when the request was rejected before it was sent.

use thiserror::Error;

/// Every API call resolves to a typed success or exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No connection, DNS failure or timeout.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// HTTP 401, or an authenticated call attempted without a token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// HTTP 409, e.g. registering an email that already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// HTTP 404, e.g. an unknown profile id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other 4xx, or a request rejected locally (status 0).
    #[error("validation failed ({status}): {message}")]
    ValidationFailed { status: u16, message: String },

    /// 5xx, an unexpected status, or a body that does not match the endpoint.
    #[error("server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// HTTP status behind this error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Conflict(_) => Some(409),
            ApiError::NotFound(_) => Some(404),
            ApiError::ValidationFailed { status, .. } | ApiError::ServerError { status, .. } => {
                Some(*status).filter(|s| *s != 0)
            }
            ApiError::NetworkUnavailable(_) | ApiError::Serialization(_) => None,
        }
    }

    /// Classify a non-success status. `message` is already extracted from the body.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            400..=499 => ApiError::ValidationFailed { status, message },
            _ => ApiError::ServerError { status, message },
        }
    }

    pub(crate) fn local_validation(message: impl Into<String>) -> Self {
        ApiError::ValidationFailed {
            status: 0,
            message: message.into(),
        }
    }

    pub(crate) fn malformed(status: u16, detail: impl Into<String>) -> Self {
        ApiError::ServerError {
            status,
            message: format!("malformed response: {}", detail.into()),
        }
    }
}
