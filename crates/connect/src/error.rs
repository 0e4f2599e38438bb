//! Error types for the Faire connector.

use std::time::Duration;

use faire_sync_core::sync::{classify_http_status, SyncRetryClass};
use thiserror::Error;

/// Result type alias for connector operations.
pub type Result<T> = std::result::Result<T, ConnectError>;

/// Errors that can occur while talking to Faire or mirroring its catalog.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the Faire API
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        retry_after: Option<Duration>,
    },

    /// Invalid request (bad header values, unusable cursor, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication error (missing or malformed credentials)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// An API record could not be mapped to the local schema
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Error from the domain/storage layer
    #[error(transparent)]
    Core(#[from] faire_sync_core::Error),
}

impl ConnectError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping(message.into())
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided wait hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Api { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Classify error for retry policy.
    pub fn retry_class(&self) -> SyncRetryClass {
        match self {
            Self::Api { status, .. } => classify_http_status(*status),
            Self::Http(err) => {
                if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
                    SyncRetryClass::Retryable
                } else {
                    SyncRetryClass::Permanent
                }
            }
            Self::Auth(_) => SyncRetryClass::ReauthRequired,
            Self::Json(_) | Self::InvalidRequest(_) | Self::Mapping(_) | Self::Core(_) => {
                SyncRetryClass::Permanent
            }
        }
    }
}
