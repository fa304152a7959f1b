//! Response classification
//!
//! Maps status classes onto [`ClientError`]. Error bodies are JSON of the
//! form `{ "code": 50035, "message": "...", "errors": {...} }`; anything else
//! is kept as text.

use std::time::Duration;

use chat_common::ClientError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

const GLOBAL_HEADER: &str = "x-ratelimit-global";

/// Successful response
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Body(Value),
    NoContent,
}

impl ApiResponse {
    /// The JSON body, if there was one
    #[must_use]
    pub fn into_body(self) -> Option<Value> {
        match self {
            Self::Body(value) => Some(value),
            Self::NoContent => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Value>,
    #[serde(default)]
    retry_after: Option<f64>,
    #[serde(default)]
    global: bool,
}

impl ErrorBody {
    fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    fn message_or(&self, fallback: &str) -> String {
        self.message.clone().unwrap_or_else(|| fallback.to_string())
    }
}

fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}

/// Turn a successful status and its body into an [`ApiResponse`]
///
/// # Errors
/// Returns `Decode` when a non-empty body is not JSON
pub fn success(status: StatusCode, body: &str) -> Result<ApiResponse, ClientError> {
    if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
        return Ok(ApiResponse::NoContent);
    }
    Ok(ApiResponse::Body(serde_json::from_str(body)?))
}

/// Classify a failed response
#[must_use]
pub fn classify(status: StatusCode, headers: &HeaderMap, body: &str) -> ClientError {
    let parsed = ErrorBody::parse(body);
    let message = parsed
        .as_ref()
        .map_or_else(|| body.to_string(), |b| b.message_or(body));

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Auth(message),
        StatusCode::FORBIDDEN => ClientError::Permission(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => {
            let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
            let retry_after = parsed
                .as_ref()
                .and_then(|b| b.retry_after)
                .or_else(|| header(RETRY_AFTER.as_str()).and_then(|v| v.trim().parse().ok()))
                .and_then(seconds)
                .unwrap_or_default();
            let global = parsed.as_ref().is_some_and(|b| b.global)
                || header(GLOBAL_HEADER).is_some_and(|v| v.eq_ignore_ascii_case("true"));
            ClientError::RateLimited { retry_after, global }
        }
        StatusCode::BAD_REQUEST => {
            let parsed = parsed.unwrap_or_default();
            ClientError::Validation {
                code: parsed.code,
                message,
                errors: parsed.errors,
            }
        }
        s if s.is_server_error() => ClientError::ServerFault { status: s.as_u16() },
        s => ClientError::Unclassified {
            status: s.as_u16(),
            body: body.to_string(),
        },
    }
}
