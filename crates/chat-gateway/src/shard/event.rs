//! Events fanned in from every shard

use crate::events::GatewayEvent;
use crate::protocol::CloseCode;
use std::time::Duration;

/// One item of the manager's fan-in stream, tagged with its shard
///
/// Items from one shard arrive in the order that shard produced them; items
/// from different shards interleave arbitrarily.
#[derive(Debug, Clone)]
pub enum ShardEvent {
    /// A decoded dispatch event
    Dispatch {
        shard_id: u32,
        /// Total shards, so consumers can route guild ids themselves
        shard_count: u32,
        sequence: Option<u64>,
        event: GatewayEvent,
    },
    /// The shard identified and received READY
    Ready { shard_id: u32, session_id: String },
    /// The shard resumed and replay finished
    Resumed { shard_id: u32 },
    /// The connection dropped; a reconnect follows after `delay`
    Reconnecting {
        shard_id: u32,
        attempt: u32,
        delay: Duration,
        resume: bool,
    },
    /// The shard stopped for good
    Disconnected { shard_id: u32 },
    /// The gateway closed with a code that forbids reconnecting
    Fatal { shard_id: u32, close_code: CloseCode },
}

impl ShardEvent {
    #[must_use]
    pub fn shard_id(&self) -> u32 {
        match self {
            Self::Dispatch { shard_id, .. }
            | Self::Ready { shard_id, .. }
            | Self::Resumed { shard_id }
            | Self::Reconnecting { shard_id, .. }
            | Self::Disconnected { shard_id }
            | Self::Fatal { shard_id, .. } => *shard_id,
        }
    }

    #[must_use]
    pub fn is_dispatch(&self) -> bool {
        matches!(self, Self::Dispatch { .. })
    }
}
