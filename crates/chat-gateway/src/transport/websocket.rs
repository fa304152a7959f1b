//! WebSocket transport over tokio-tungstenite

use super::{Connector, Inbound, Transport};
use crate::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Connects with `tokio_tungstenite::connect_async`
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

/// An open WebSocket
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    async fn connect(&self, url: &str) -> GatewayResult<Self::Transport> {
        let (stream, response) = connect_async(url)
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        tracing::debug!(url = %url, status = %response.status(), "WebSocket connected");

        Ok(WebSocketTransport { stream })
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, text: String) -> GatewayResult<()> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))
    }

    async fn recv(&mut self) -> Option<GatewayResult<Inbound>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(e) => return Some(Err(GatewayError::Transport(e.to_string()))),
            };

            match message {
                Message::Text(text) => return Some(Ok(Inbound::Text(text))),
                Message::Binary(bytes) => {
                    return Some(
                        String::from_utf8(bytes)
                            .map(Inbound::Text)
                            .map_err(|e| GatewayError::Decode(e.to_string())),
                    );
                }
                Message::Close(frame) => {
                    return Some(Ok(Inbound::Close(frame.map(|f| u16::from(f.code)))));
                }
                // Pongs are written by tungstenite while reading
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    async fn close(&mut self, code: u16) -> GatewayResult<()> {
        let frame = CloseFrame {
            code: WsCloseCode::from(code),
            reason: "".into(),
        };
        self.stream
            .close(Some(frame))
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))
    }
}
