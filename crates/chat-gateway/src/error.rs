//! Session error types

use crate::events::PayloadError;
use crate::protocol::CloseCode;
use thiserror::Error;

/// Failures inside a Session
///
/// These drive reconnects and shard lifecycle notifications; they never reach
/// a caller as the result of an API call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The connection could not be opened or broke mid-stream
    #[error("Transport error: {0}")]
    Transport(String),

    /// A frame could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The remote side closed the connection
    #[error("Connection closed (code {0:?})")]
    Closed(Option<u16>),

    /// The session was told to stop
    #[error("Session cancelled")]
    Cancelled,

    /// The remote side closed with a code that forbids reconnecting
    #[error("Fatal close: {0}")]
    Fatal(CloseCode),

    /// No session runs for this shard id
    #[error("Unknown shard {0}")]
    UnknownShard(u32),
}

impl GatewayError {
    /// Close code observed with this failure, if any
    #[must_use]
    pub fn close_code(&self) -> Option<u16> {
        match self {
            Self::Closed(code) => *code,
            Self::Fatal(code) => Some(code.as_u16()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Fatal(_) => true,
            Self::Closed(Some(code)) => CloseCode::from_u16(*code).is_some_and(CloseCode::is_fatal),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<PayloadError> for GatewayError {
    fn from(err: PayloadError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
