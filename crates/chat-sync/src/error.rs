//! Errors raised while applying one event
//!
//! None of these stop the synchronizer; the event is logged and skipped.

use chat_core::DomainError;
use chat_gateway::PayloadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Malformed payload: {0}")]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type SyncResult<T> = Result<T, SyncError>;
