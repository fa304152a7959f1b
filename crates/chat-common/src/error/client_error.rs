//! Client error types
//!
//! Request/response failures surface synchronously as one of these. Session
//! connectivity problems are handled inside the gateway and only appear here
//! as `ConnectionLost` when a caller asks a shard to do something while it is
//! down. `ProtocolDesync` is recorded by the synchronizer and never aborts
//! event processing.

use chat_core::{DomainError, Snowflake};
use std::time::Duration;

use crate::config::ConfigError;

/// Field-level validation details, as returned by the remote platform
pub type FieldErrors = serde_json::Value;

/// Client-wide error type
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    // Credential and access
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Missing permissions: {0}")]
    Permission(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Throttling
    #[error("Rate limited, retry after {retry_after:?} (global: {global})")]
    RateLimited { retry_after: Duration, global: bool },

    // Structured validation
    #[error("Validation error {code}: {message}")]
    Validation {
        code: u32,
        message: String,
        errors: Option<FieldErrors>,
    },

    // Remote faults
    #[error("Server fault (HTTP {status})")]
    ServerFault { status: u16 },

    #[error("Unexpected response (HTTP {status}): {body}")]
    Unclassified { status: u16, body: String },

    // Push connection
    #[error("Connection lost (close code {close_code:?})")]
    ConnectionLost { close_code: Option<u16> },

    #[error("Protocol desync: {kind} {id} is not cached")]
    ProtocolDesync { kind: &'static str, id: Snowflake },

    // Local failures
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl ClientError {
    /// HTTP status the error originated from, if any
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Auth(_) => Some(401),
            Self::Permission(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::Validation { .. } => Some(400),
            Self::ServerFault { status } | Self::Unclassified { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get a stable error code for logs and callers
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Auth(_) => "AUTH_FAILED",
            Self::Permission(_) => "MISSING_PERMISSIONS",
            Self::NotFound(_) => "NOT_FOUND",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::ServerFault { .. } => "SERVER_FAULT",
            Self::Unclassified { .. } => "UNCLASSIFIED",
            Self::ConnectionLost { .. } => "CONNECTION_LOST",
            Self::ProtocolDesync { .. } => "PROTOCOL_DESYNC",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller may retry the same call later
    ///
    /// Nothing in this crate retries on its own.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::ServerFault { .. }
                | Self::Transport(_)
                | Self::ConnectionLost { .. }
        )
    }

    /// How long a rate-limited caller should wait
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Create a decode error
    #[must_use]
    pub fn decode(msg: impl std::fmt::Display) -> Self {
        Self::Decode(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err)
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
