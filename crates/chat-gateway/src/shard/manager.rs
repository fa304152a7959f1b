//! Shard manager
//!
//! Owns one [`Session`] per shard, shares the identify gate between them, and
//! fans every shard's events into a single channel.

use super::{shard_for, IdentifyGate, ShardEvent};
use crate::error::{GatewayError, GatewayResult};
use crate::protocol::{GatewayMessage, PresenceUpdatePayload, RequestGuildMembersPayload};
use crate::session::{BackoffPolicy, Session, SessionConfig, SessionLimits, SessionState};
use crate::transport::Connector;
use chat_common::ClientConfig;
use chat_core::Snowflake;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Queue depth for commands sent to one shard
const COMMAND_BUFFER: usize = 32;

/// Handle to one running session
struct ShardHandle {
    commands: mpsc::Sender<GatewayMessage>,
    state: watch::Receiver<SessionState>,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Runs every shard of one client
pub struct ShardManager {
    shard_count: u32,
    gate: Arc<IdentifyGate>,
    shards: Vec<ShardHandle>,
}

impl ShardManager {
    /// Spawn one session per configured shard
    ///
    /// Returns the manager and the fan-in stream; events from one shard keep
    /// their order, events from different shards interleave.
    pub fn start<C: Connector>(config: &ClientConfig, connector: C) -> (Self, mpsc::Receiver<ShardEvent>) {
        let shard_count = config.gateway.shard_count;
        let connector = Arc::new(connector);
        let gate = Arc::new(IdentifyGate::new(config.gateway.identify_interval));
        let (events_tx, events_rx) = mpsc::channel(config.gateway.event_buffer);

        let limits = SessionLimits {
            backoff: BackoffPolicy::from_config(&config.backoff),
            max_resume_attempts: config.backoff.max_resume_attempts,
            sustained_connection: config.gateway.sustained_connection,
        };

        let shards = (0..shard_count)
            .map(|shard_id| {
                let session_config = SessionConfig {
                    shard_id,
                    shard_count,
                    gateway_url: config.gateway.url.clone(),
                    token: config.token.clone(),
                    intents: config.gateway.intents,
                    large_threshold: config.gateway.large_threshold,
                    presence: None,
                    limits,
                };
                let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
                let (state_tx, state_rx) = watch::channel(SessionState::Disconnected);
                let (stop_tx, stop_rx) = watch::channel(false);

                let session = Session::new(
                    session_config,
                    Arc::clone(&connector),
                    Arc::clone(&gate),
                    events_tx.clone(),
                    commands_rx,
                    state_tx,
                    stop_rx,
                );

                ShardHandle {
                    commands: commands_tx,
                    state: state_rx,
                    stop: stop_tx,
                    task: tokio::spawn(session.run()),
                }
            })
            .collect();

        tracing::info!(shard_count, "Shard manager started");

        (
            Self {
                shard_count,
                gate,
                shards,
            },
            events_rx,
        )
    }

    #[must_use]
    pub fn shard_count(&self) -> u32 {
        self.shard_count
    }

    /// Shard responsible for a guild
    #[must_use]
    pub fn shard_for(&self, guild_id: Snowflake) -> u32 {
        shard_for(guild_id, self.shard_count)
    }

    #[must_use]
    pub fn identify_gate(&self) -> &IdentifyGate {
        &self.gate
    }

    fn shard(&self, shard_id: u32) -> GatewayResult<&ShardHandle> {
        self.shards
            .get(shard_id as usize)
            .ok_or(GatewayError::UnknownShard(shard_id))
    }

    /// Current state of one shard
    #[must_use]
    pub fn shard_state(&self, shard_id: u32) -> Option<SessionState> {
        self.shard(shard_id).ok().map(|s| s.state.borrow().clone())
    }

    /// Watch one shard's state changes
    #[must_use]
    pub fn watch_state(&self, shard_id: u32) -> Option<watch::Receiver<SessionState>> {
        self.shard(shard_id).ok().map(|s| s.state.clone())
    }

    /// Number of shards currently connected
    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.shards
            .iter()
            .filter(|s| s.state.borrow().is_connected())
            .count()
    }

    /// Queue a frame on one shard's connection
    pub async fn send(&self, shard_id: u32, message: GatewayMessage) -> GatewayResult<()> {
        self.shard(shard_id)?
            .commands
            .send(message)
            .await
            .map_err(|_| GatewayError::Closed(None))
    }

    /// Ask the shard owning `guild_id` for member chunks
    pub async fn request_guild_members(&self, request: RequestGuildMembersPayload) -> GatewayResult<()> {
        let shard_id = self.shard_for(request.guild_id);
        tracing::debug!(shard_id, guild_id = %request.guild_id, "Requesting guild members");
        self.send(shard_id, GatewayMessage::request_guild_members(&request)?)
            .await
    }

    /// Set the client's presence on every shard
    pub async fn update_presence(&self, presence: PresenceUpdatePayload) -> GatewayResult<()> {
        let frame = GatewayMessage::presence_update(&presence)?;
        for shard_id in 0..self.shard_count {
            self.send(shard_id, frame.clone()).await?;
        }
        Ok(())
    }

    /// Stop one shard; it closes its connection and reports `Disconnected`
    pub fn disconnect(&self, shard_id: u32) -> GatewayResult<()> {
        self.shard(shard_id)?.stop.send_replace(true);
        Ok(())
    }

    /// Stop every shard and wait for their tasks to finish
    pub async fn shutdown(self) {
        for shard in &self.shards {
            shard.stop.send_replace(true);
        }
        for (shard_id, shard) in self.shards.into_iter().enumerate() {
            if let Err(e) = shard.task.await {
                tracing::warn!(shard_id, error = %e, "Session task failed");
            }
        }
        tracing::info!("Shard manager stopped");
    }
}

impl std::fmt::Debug for ShardManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardManager")
            .field("shard_count", &self.shard_count)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
