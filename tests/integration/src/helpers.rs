//! Test helpers for integration tests
//!
//! - [`ScriptedGateway`]: an in-memory gateway the tests drive frame by frame
//! - [`Mirror`]: shard manager plus synchronizer wired to a scripted gateway
//! - [`TestServer`]: a fake REST platform for exercising `RestClient`

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use chat_api::RestClient;
use chat_cache::Cache;
use chat_common::{BackoffConfig, ClientConfig, Token};
use chat_gateway::{
    Connector, GatewayError, GatewayMessage, GatewayResult, Inbound, OpCode, ShardManager, Transport,
};
use chat_sync::{CacheEvent, CacheSynchronizer};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// How long any single wait in a test may take
pub const WAIT: Duration = Duration::from_secs(5);

/// Heartbeat interval long enough that no heartbeat fires during a test
pub const QUIET_HEARTBEAT_MS: u64 = 60_000;

pub const TEST_TOKEN: &str = "test-token";

/// Client config with fast reconnects and no identify spacing
pub fn test_config(shard_count: u32) -> ClientConfig {
    let mut config = ClientConfig::new(Token::bot(TEST_TOKEN));
    config.gateway.url = "wss://gateway.test".to_string();
    config.gateway.shard_count = shard_count;
    config.gateway.identify_interval = Duration::ZERO;
    config.backoff = BackoffConfig {
        base: Duration::from_millis(10),
        max: Duration::from_millis(40),
        max_resume_attempts: 3,
        jitter: false,
    };
    config
}

// ============================================================================
// Scripted gateway
// ============================================================================

/// What the client wrote to a scripted connection
#[derive(Debug)]
pub enum ClientFrame {
    Message(GatewayMessage),
    Close(u16),
}

/// Client half of a scripted connection
pub struct ScriptedTransport {
    inbound: mpsc::UnboundedReceiver<Inbound>,
    outbound: mpsc::UnboundedSender<ClientFrame>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&mut self, text: String) -> GatewayResult<()> {
        let message = GatewayMessage::from_json(&text).map_err(|e| GatewayError::Decode(e.to_string()))?;
        self.outbound
            .send(ClientFrame::Message(message))
            .map_err(|_| GatewayError::Transport("gateway hung up".to_string()))
    }

    async fn recv(&mut self) -> Option<GatewayResult<Inbound>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self, code: u16) -> GatewayResult<()> {
        let _ = self.outbound.send(ClientFrame::Close(code));
        Ok(())
    }
}

/// Hands every new connection to the test
pub struct ScriptedConnector {
    connections: mpsc::UnboundedSender<ServerConnection>,
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Transport = ScriptedTransport;

    async fn connect(&self, url: &str) -> GatewayResult<Self::Transport> {
        let (to_client, inbound) = mpsc::unbounded_channel();
        let (outbound, from_client) = mpsc::unbounded_channel();
        self.connections
            .send(ServerConnection {
                url: url.to_string(),
                to_client,
                from_client,
            })
            .map_err(|_| GatewayError::Transport("gateway is gone".to_string()))?;
        Ok(ScriptedTransport { inbound, outbound })
    }
}

/// Server side of the scripted gateway: yields each connection as it opens
pub struct ScriptedGateway {
    connections: mpsc::UnboundedReceiver<ServerConnection>,
}

/// Create a connected connector/gateway pair
pub fn scripted_gateway() -> (ScriptedConnector, ScriptedGateway) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ScriptedConnector { connections: tx }, ScriptedGateway { connections: rx })
}

impl ScriptedGateway {
    /// Wait for the client's next connection
    pub async fn accept(&mut self) -> ServerConnection {
        tokio::time::timeout(WAIT, self.connections.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("connector dropped")
    }

    /// Whether a connection is waiting right now
    pub fn has_pending(&mut self) -> bool {
        !self.connections.is_empty()
    }
}

/// One open connection, seen from the gateway
pub struct ServerConnection {
    pub url: String,
    to_client: mpsc::UnboundedSender<Inbound>,
    from_client: mpsc::UnboundedReceiver<ClientFrame>,
}

impl ServerConnection {
    pub fn send(&self, message: &GatewayMessage) {
        let text = message.to_json().expect("encode frame");
        // The client may already have dropped this connection
        let _ = self.to_client.send(Inbound::Text(text));
    }

    pub fn hello(&self, heartbeat_interval_ms: u64) {
        self.send(&GatewayMessage::hello(heartbeat_interval_ms));
    }

    pub fn dispatch(&self, sequence: u64, name: &str, data: Value) {
        self.send(&GatewayMessage::dispatch(name, sequence, data));
    }

    pub fn ack(&self) {
        self.send(&GatewayMessage::heartbeat_ack());
    }

    /// Close with a code, as the gateway would
    pub fn close(&self, code: u16) {
        let _ = self.to_client.send(Inbound::Close(Some(code)));
    }

    /// Drop the connection without a close frame
    pub fn hang_up(self) {}

    /// Next frame the client wrote, `None` once it dropped the connection
    pub async fn next_frame(&mut self) -> Option<ClientFrame> {
        tokio::time::timeout(WAIT, self.from_client.recv())
            .await
            .expect("timed out waiting for a client frame")
    }

    /// Next message with opcode `op`, skipping heartbeats unless asked for
    pub async fn expect_op(&mut self, op: OpCode) -> GatewayMessage {
        loop {
            match self.next_frame().await {
                Some(ClientFrame::Message(message)) if message.op == op => return message,
                Some(ClientFrame::Message(message)) if message.op == OpCode::Heartbeat => {}
                other => panic!("expected {op}, got {other:?}"),
            }
        }
    }

    /// Wait until the client closes or drops this connection
    pub async fn expect_closed(&mut self) -> Option<u16> {
        loop {
            match self.next_frame().await {
                None => return None,
                Some(ClientFrame::Close(code)) => return Some(code),
                Some(ClientFrame::Message(_)) => {}
            }
        }
    }

    /// Hello, expect identify, answer with READY at sequence 1
    pub async fn establish(&mut self, session_id: &str, guilds: &[u64], shard: [u32; 2]) -> GatewayMessage {
        self.hello(QUIET_HEARTBEAT_MS);
        let identify = self.expect_op(OpCode::Identify).await;
        self.dispatch(1, "READY", crate::fixtures::ready(session_id, guilds, shard));
        identify
    }
}

// ============================================================================
// Mirror harness
// ============================================================================

/// A running client: scripted gateway, shard manager and synchronizer
pub struct Mirror {
    pub gateway: ScriptedGateway,
    pub manager: ShardManager,
    pub synchronizer: Arc<CacheSynchronizer>,
    pub notifications: broadcast::Receiver<CacheEvent>,
    task: JoinHandle<()>,
}

impl Mirror {
    pub fn start(config: &ClientConfig) -> Self {
        let cache = Arc::new(Cache::new(config.cache));
        let synchronizer = Arc::new(CacheSynchronizer::new(cache, 4096));
        let notifications = synchronizer.subscribe();

        let (connector, gateway) = scripted_gateway();
        let (manager, events) = ShardManager::start(config, connector);
        let task = {
            let synchronizer = Arc::clone(&synchronizer);
            tokio::spawn(async move { synchronizer.run(events).await })
        };

        Self {
            gateway,
            manager,
            synchronizer,
            notifications,
            task,
        }
    }

    pub fn cache(&self) -> &Arc<Cache> {
        self.synchronizer.cache()
    }

    /// Skip notifications until one matches
    pub async fn wait_for(&mut self, mut matches: impl FnMut(&CacheEvent) -> bool) -> CacheEvent {
        let wait = async {
            loop {
                match self.notifications.recv().await {
                    Ok(event) if matches(&event) => return event,
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => panic!("notifications closed"),
                }
            }
        };
        tokio::time::timeout(WAIT, wait)
            .await
            .expect("timed out waiting for a notification")
    }

    /// Stop every shard and drain the synchronizer
    pub async fn shutdown(self) -> Arc<CacheSynchronizer> {
        self.manager.shutdown().await;
        self.task.await.expect("synchronizer task");
        self.synchronizer
    }
}

// ============================================================================
// Fake REST platform
// ============================================================================

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    _handle: JoinHandle<()>,
}

fn error_body(status: StatusCode, code: u32, message: &str) -> Response {
    (status, Json(json!({ "code": code, "message": message }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bot {TEST_TOKEN}"))
}

async fn current_user(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return error_body(StatusCode::UNAUTHORIZED, 0, "401: Unauthorized");
    }
    let agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Json(json!({ "id": "1", "username": "mirror", "agent": agent })).into_response()
}

async fn create_message(Path(channel_id): Path<String>, Json(body): Json<Value>) -> Response {
    if body["content"].as_str().is_some_and(|c| c.len() > 20) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "code": 50035,
                "message": "Invalid Form Body",
                "errors": { "content": { "_errors": [{ "code": "BASE_TYPE_MAX_LENGTH" }] } }
            })),
        )
            .into_response();
    }
    Json(json!({ "id": "900", "channel_id": channel_id, "content": body["content"] })).into_response()
}

async fn upload(headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = String::from_utf8_lossy(&body).into_owned();
    Json(json!({
        "multipart": content_type.starts_with("multipart/form-data"),
        "payload_json": body.contains("name=\"payload_json\""),
        "file": body.contains("name=\"files[0]\"") && body.contains("filename=\"notes.txt\""),
        "metadata": body.contains("\"content\":\"see attached\""),
    }))
    .into_response()
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn rate_limited() -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, "2")],
        Json(json!({ "message": "You are being rate limited.", "retry_after": 0.25, "global": false })),
    )
        .into_response()
}

async fn forbidden() -> Response {
    error_body(StatusCode::FORBIDDEN, 50013, "Missing Permissions")
}

async fn missing() -> Response {
    error_body(StatusCode::NOT_FOUND, 10003, "Unknown Channel")
}

async fn broken() -> StatusCode {
    StatusCode::BAD_GATEWAY
}

async fn teapot() -> (StatusCode, &'static str) {
    (StatusCode::IM_A_TEAPOT, "short and stout")
}

fn platform() -> Router {
    Router::new()
        .route("/users/@me", get(current_user))
        .route("/channels/:id/messages", post(create_message))
        .route("/channels/:id/attachments", post(upload))
        .route("/channels/:id/messages/:message_id", delete(no_content))
        .route("/channels/:id/pins/:message_id", put(no_content))
        .route("/guilds/:id/members/:user_id", patch(forbidden))
        .route("/channels/:id", get(missing))
        .route("/limited", get(rate_limited))
        .route("/broken", get(broken))
        .route("/teapot", get(teapot))
}

impl TestServer {
    /// Start the fake platform on an ephemeral port
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, platform()).await.ok();
        });

        Ok(Self { addr, _handle: handle })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client holding the test credential
    pub fn client(&self) -> Result<RestClient> {
        Ok(RestClient::with_base_url(&Token::bot(TEST_TOKEN), &self.base_url(), "chat-mirror-tests")?)
    }

    /// A client holding a credential the platform rejects
    pub fn client_with_token(&self, token: &str) -> Result<RestClient> {
        Ok(RestClient::with_base_url(&Token::bot(token), &self.base_url(), "chat-mirror-tests")?)
    }
}
