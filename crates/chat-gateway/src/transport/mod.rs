//! Push-connection transport
//!
//! A Session talks to the gateway through these two traits, so tests can
//! script a gateway in memory while production uses a WebSocket.

mod websocket;

pub use websocket::{WebSocketConnector, WebSocketTransport};

use crate::error::GatewayResult;
use async_trait::async_trait;

/// A frame received from the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A JSON text frame
    Text(String),
    /// The remote side closed, with its close code if it sent one
    Close(Option<u16>),
}

/// One open connection
///
/// `recv` must be cancel-safe: the session polls it inside `select!`.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, text: String) -> GatewayResult<()>;

    /// Next inbound frame, `None` once the stream has ended
    async fn recv(&mut self) -> Option<GatewayResult<Inbound>>;

    async fn close(&mut self, code: u16) -> GatewayResult<()>;
}

/// Opens connections to a gateway URL
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport + 'static;

    async fn connect(&self, url: &str) -> GatewayResult<Self::Transport>;
}
