//! Error taxonomy for every API call made through the client.

use crate::config::ConfigError;
use crate::net::types::message_from_body;
use crate::store::StoreError;

/// Errors surfaced to callers of the API client and session context.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered 401 and no refresh was attempted or it was spent.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The refresh call itself failed; the session has been cleared.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// Credentials were cleared by another request while this one waited.
    #[error("session expired")]
    SessionExpired,

    /// The envelope reported `success: false`.
    #[error("{message}")]
    Rejected { message: String },

    /// Non-success HTTP status other than 401.
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, DNS or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// A request body could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),

    /// A response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// Build an [`ApiError::Unauthorized`] from a 401 response body.
    #[must_use]
    pub fn unauthorized(body: &str) -> Self {
        Self::Unauthorized { message: message_from_body(body).unwrap_or_else(|| "Unauthorized".to_owned()) }
    }

    /// Build an [`ApiError::Status`] from a non-success response.
    #[must_use]
    pub fn status(status: u16, body: &str) -> Self {
        Self::Status { status, message: message_from_body(body).unwrap_or_else(|| format!("HTTP {status}")) }
    }

    /// One-line message suitable for showing to a user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Unauthorized { message } | Self::Rejected { message } | Self::Status { message, .. } => {
                message.clone()
            }
            Self::RefreshFailed(_) | Self::SessionExpired => "Your session has expired. Please log in again.".into(),
            other => other.to_string(),
        }
    }

    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "E_UNAUTHORIZED",
            Self::RefreshFailed(_) => "E_REFRESH_FAILED",
            Self::SessionExpired => "E_SESSION_EXPIRED",
            Self::Rejected { .. } => "E_REJECTED",
            Self::Status { .. } => "E_STATUS",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Encode(_) => "E_ENCODE",
            Self::Decode(_) => "E_DECODE",
            Self::Store(_) => "E_STORE",
            Self::Config(_) => "E_CONFIG",
        }
    }

    /// True for the unauthenticated class: the caller must log in again.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::RefreshFailed(_) | Self::SessionExpired)
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
