//! Client error taxonomy
//!
//! Every failure a view can see is a [`ClientError`]. Local pre-check
//! failures ([`LifecycleError`], [`ValidationError`]) and backend responses
//! land in the same variants, so a view handles "not allowed" the same way
//! whether the client or the server said it.
//!
//! | HTTP status      | Variant        |
//! |------------------|----------------|
//! | 400, 422         | `Validation`   |
//! | 401 (after refresh) | `SessionExpired` |
//! | 403              | `Permission`   |
//! | 404              | `NotFound`     |
//! | 409, other 4xx   | `InvalidState` |
//! | 5xx              | `Server`       |

use crate::config::ConfigError;
use crate::transport::TransportError;
use offer_billing_core::{LifecycleError, ValidationError};
use thiserror::Error;

/// Coarse category of a [`ClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    InvalidState,
    Permission,
    NotFound,
    Network,
    Server,
    SessionExpired,
    Cancelled,
    Decode,
    Config,
}

/// Failure of an API call or a local pre-check
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    InvalidState { message: String },

    #[error("{message}")]
    Permission { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Session expired")]
    SessionExpired,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation { .. } => ErrorKind::Validation,
            ClientError::InvalidState { .. } => ErrorKind::InvalidState,
            ClientError::Permission { .. } => ErrorKind::Permission,
            ClientError::NotFound { .. } => ErrorKind::NotFound,
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Server { .. } => ErrorKind::Server,
            ClientError::SessionExpired => ErrorKind::SessionExpired,
            ClientError::Cancelled => ErrorKind::Cancelled,
            ClientError::Decode(_) => ErrorKind::Decode,
            ClientError::Config(_) => ErrorKind::Config,
        }
    }

    /// Map a non-success, non-401 response to an error
    ///
    /// The message comes from the body's `message` or `error` field when
    /// present.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = error_message(body).unwrap_or_else(|| format!("Request failed with status {status}"));
        match status {
            400 | 422 => ClientError::Validation { message },
            401 => ClientError::SessionExpired,
            403 => ClientError::Permission { message },
            404 => ClientError::NotFound { message },
            500..=599 => ClientError::Server { status, message },
            _ => ClientError::InvalidState { message },
        }
    }

    /// Text for a toast or inline notice; `None` when nothing should be shown
    pub fn notice(&self) -> Option<String> {
        match self {
            ClientError::Cancelled => None,
            ClientError::SessionExpired => {
                Some("Your session has expired. Please sign in again.".to_string())
            }
            ClientError::Network(_) => {
                Some("Could not reach the server. Check your connection and try again.".to_string())
            }
            ClientError::Server { .. } => {
                Some("Something went wrong on our side. Please try again later.".to_string())
            }
            ClientError::Decode(_) | ClientError::Config(_) => {
                Some("Something went wrong. Please try again later.".to_string())
            }
            ClientError::Validation { message }
            | ClientError::InvalidState { message }
            | ClientError::Permission { message }
            | ClientError::NotFound { message } => Some(message.clone()),
        }
    }

    /// Whether re-issuing the same request later might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Network | ErrorKind::Server)
    }
}

fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let text = value
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| {
            let error = value.get("error")?;
            error.as_str().or_else(|| error.get("message")?.as_str())
        })?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Validation {
            message: err.to_string(),
        }
    }
}

impl From<LifecycleError> for ClientError {
    fn from(err: LifecycleError) -> Self {
        let message = err.to_string();
        match err {
            LifecycleError::Validation(_) => ClientError::Validation { message },
            LifecycleError::InvalidState { .. } => ClientError::InvalidState { message },
            LifecycleError::Permission { .. } => ClientError::Permission { message },
        }
    }
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        ClientError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
