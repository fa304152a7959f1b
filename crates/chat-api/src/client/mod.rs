//! Authenticated request/response client
//!
//! ```ignore
//! let client = RestClient::new(&config)?;
//! let channel = client.get("/channels/10").await?.into_body();
//! client.post("/channels/10/messages", &json!({ "content": "hi" })).await?;
//! ```

use chat_common::{ClientConfig, ClientError, ClientResult, Token};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;

use crate::response::{classify, success, ApiResponse};

/// A file sent alongside JSON metadata
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Attachment {
    #[must_use]
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data,
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

fn transport(err: reqwest::Error) -> ClientError {
    ClientError::Transport(err.to_string())
}

/// Client for one-shot calls
///
/// Cloning is cheap; clones share the connection pool and the credential.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
}

impl RestClient {
    /// Build a client from the API settings and credential in `config`
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Self::with_base_url(&config.token, &config.api.base_url, &config.api.user_agent)
    }

    /// Build a client against an explicit base URL
    pub fn with_base_url(token: &Token, base_url: &str, user_agent: &str) -> ClientResult<Self> {
        let mut authorization = HeaderValue::from_str(&token.authorization_header())
            .map_err(|_| ClientError::Auth("credential is not a valid header value".to_string()))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()
            .map_err(transport)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    async fn execute(&self, method: &Method, path: &str, request: RequestBuilder) -> ClientResult<ApiResponse> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(transport)?;

        if status.is_success() {
            tracing::debug!(%method, path, status = status.as_u16(), "Request succeeded");
            return success(status, &body);
        }

        let err = classify(status, &headers, &body);
        tracing::warn!(%method, path, status = status.as_u16(), code = err.error_code(), "Request failed");
        Err(err)
    }

    async fn send_json<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<ApiResponse> {
        let mut request = self.request(method.clone(), path);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(&method, path, request).await
    }

    pub async fn get(&self, path: &str) -> ClientResult<ApiResponse> {
        self.send_json::<()>(Method::GET, path, None).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<ApiResponse> {
        self.send_json::<()>(Method::DELETE, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<ApiResponse> {
        self.send_json(Method::POST, path, Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<ApiResponse> {
        self.send_json(Method::PATCH, path, Some(body)).await
    }

    /// PUT with an optional body; several endpoints take none
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: Option<&B>) -> ClientResult<ApiResponse> {
        self.send_json(Method::PUT, path, body).await
    }

    /// POST a multipart form: the JSON metadata as `payload_json` plus one
    /// `files[n]` part per attachment
    pub async fn post_multipart<B: Serialize + ?Sized>(
        &self,
        path: &str,
        metadata: &B,
        attachments: Vec<Attachment>,
    ) -> ClientResult<ApiResponse> {
        let payload = serde_json::to_string(metadata)?;
        let mut form = Form::new().part(
            "payload_json",
            Part::text(payload)
                .mime_str("application/json")
                .map_err(transport)?,
        );

        for (index, attachment) in attachments.into_iter().enumerate() {
            let mut part = Part::bytes(attachment.data).file_name(attachment.filename);
            if let Some(content_type) = &attachment.content_type {
                part = part.mime_str(content_type).map_err(transport)?;
            }
            form = form.part(format!("files[{index}]"), part);
        }

        let request = self.request(Method::POST, path).multipart(form);
        self.execute(&Method::POST, path, request).await
    }
}
