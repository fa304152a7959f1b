//! # chat-api
//!
//! Request/response client for one-shot calls against the platform.
//!
//! Every call carries the configured credential. Responses are either a JSON
//! body, no content, or a classified [`ClientError`](chat_common::ClientError).
//! Nothing here retries; callers decide what to do with `RateLimited` and
//! `ServerFault`.

pub mod client;
pub mod response;

pub use client::{Attachment, RestClient};
pub use response::{classify, ApiResponse};
