//! # chat-gateway
//!
//! Client side of the push connection: protocol frames, typed dispatch events,
//! the per-shard session state machine, and the shard manager.
//!
//! ## Flow
//!
//! ```text
//! ShardManager ──spawns──> Session (one per shard) ──Transport──> gateway
//!      │                        │
//!      └──── mpsc<ShardEvent> <─┘   (ordered per shard)
//! ```

pub mod error;
pub mod events;
pub mod protocol;
pub mod session;
pub mod shard;
pub mod transport;

pub use error::{GatewayError, GatewayResult};
pub use events::{GatewayEvent, GatewayEventType, GuildSnapshot, PayloadError};
pub use protocol::{CloseCode, GatewayMessage, Intents, OpCode};
pub use session::{BackoffPolicy, SessionMachine, SessionState};
pub use shard::{shard_for, IdentifyGate, ShardEvent, ShardManager};
pub use transport::{Connector, Inbound, Transport, WebSocketConnector};
