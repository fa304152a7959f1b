//! Error taxonomy surfaced to callers

mod client_error;

pub use client_error::{ClientError, ClientResult, FieldErrors};
