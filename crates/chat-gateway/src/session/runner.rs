//! Async session runner
//!
//! Drives one shard's connection: performs the I/O that [`SessionMachine`]
//! transitions ask for and forwards decoded events to the manager's fan-in.

use super::{Handshake, HeartbeatAction, Reconnect, SessionLimits, SessionMachine, SessionState};
use crate::error::GatewayResult;
use crate::events::GatewayEvent;
use crate::protocol::{
    GatewayMessage, IdentifyPayload, IdentifyProperties, OpCode, PresenceUpdatePayload,
    ResumePayload,
};
use crate::shard::{shard_for, IdentifyGate, ShardEvent};
use crate::transport::{Connector, Inbound, Transport};
use chat_common::Token;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

/// Close code used when the client drops a connection it wants to resume
const RESUMABLE_CLOSE: u16 = 4000;

/// Close code used on explicit disconnect; invalidates the session remotely
const NORMAL_CLOSE: u16 = 1000;

/// Everything one shard needs to identify
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub shard_id: u32,
    pub shard_count: u32,
    pub gateway_url: String,
    pub token: Token,
    pub intents: u64,
    pub large_threshold: u32,
    pub presence: Option<PresenceUpdatePayload>,
    pub limits: SessionLimits,
}

/// Why a connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionEnd {
    /// Lost, with the close code if the gateway sent one
    Lost(Option<u16>),
    /// Stop requested, or nobody is listening anymore
    Cancelled,
}

/// Resolves once a stop is requested or every stop sender is gone
async fn stopped(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|stop| *stop).await;
}

/// One shard's session task
pub struct Session<C: Connector> {
    config: SessionConfig,
    connector: Arc<C>,
    gate: Arc<IdentifyGate>,
    machine: SessionMachine,
    events: mpsc::Sender<ShardEvent>,
    commands: mpsc::Receiver<GatewayMessage>,
    state: watch::Sender<SessionState>,
    stop: watch::Receiver<bool>,
}

impl<C: Connector> Session<C> {
    #[must_use]
    pub fn new(
        config: SessionConfig,
        connector: Arc<C>,
        gate: Arc<IdentifyGate>,
        events: mpsc::Sender<ShardEvent>,
        commands: mpsc::Receiver<GatewayMessage>,
        state: watch::Sender<SessionState>,
        stop: watch::Receiver<bool>,
    ) -> Self {
        let machine = SessionMachine::new(config.limits);
        Self {
            config,
            connector,
            gate,
            machine,
            events,
            commands,
            state,
            stop,
        }
    }

    fn shard_id(&self) -> u32 {
        self.config.shard_id
    }

    fn publish(&self) {
        self.state.send_replace(self.machine.state().clone());
    }

    async fn emit(&self, event: ShardEvent) -> Result<(), ConnectionEnd> {
        self.events.send(event).await.map_err(|_| ConnectionEnd::Cancelled)
    }

    /// Run until stopped or closed with a fatal code
    pub async fn run(mut self) {
        let shard_id = self.shard_id();
        tracing::info!(shard_id, "Session starting");

        loop {
            if *self.stop.borrow() {
                break;
            }

            match self.run_connection().await {
                ConnectionEnd::Cancelled => break,
                ConnectionEnd::Lost(close_code) => {
                    match self.machine.on_connection_lost(close_code, Instant::now()) {
                        Reconnect::Stop(code) => {
                            self.publish();
                            tracing::error!(shard_id, close_code = %code, "Session closed with fatal code");
                            let _ = self
                                .emit(ShardEvent::Fatal {
                                    shard_id,
                                    close_code: code,
                                })
                                .await;
                            break;
                        }
                        Reconnect::Retry {
                            delay,
                            attempt,
                            resume,
                        } => {
                            self.publish();
                            tracing::info!(
                                shard_id,
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                resume,
                                close_code = ?close_code,
                                "Reconnecting"
                            );
                            let reconnecting = ShardEvent::Reconnecting {
                                shard_id,
                                attempt,
                                delay,
                                resume,
                            };
                            if self.emit(reconnecting).await.is_err() {
                                break;
                            }
                            tokio::select! {
                                () = tokio::time::sleep(delay) => {}
                                () = stopped(&mut self.stop) => break,
                            }
                        }
                    }
                }
            }
        }

        self.machine.disconnect();
        self.publish();
        tracing::info!(shard_id, "Session disconnected");
        let _ = self.events.send(ShardEvent::Disconnected { shard_id }).await;
    }

    async fn run_connection(&mut self) -> ConnectionEnd {
        let shard_id = self.shard_id();
        self.machine.begin_connect();
        self.publish();

        // Identify slots are taken before connecting so the heartbeat clock never waits on them
        if !self.machine.can_resume() {
            tokio::select! {
                () = self.gate.until_ready() => {}
                () = stopped(&mut self.stop) => return ConnectionEnd::Cancelled,
            }
        }

        let url = self.machine.connect_url(&self.config.gateway_url).to_string();
        tracing::debug!(shard_id, url = %url, "Connecting");

        let connected = tokio::select! {
            result = self.connector.connect(&url) => result,
            () = stopped(&mut self.stop) => return ConnectionEnd::Cancelled,
        };
        let mut transport = match connected {
            Ok(transport) => transport,
            Err(e) => {
                tracing::warn!(shard_id, error = %e, "Connect failed");
                return ConnectionEnd::Lost(None);
            }
        };

        let end = self.drive(&mut transport).await;
        let code = if end == ConnectionEnd::Cancelled {
            NORMAL_CLOSE
        } else {
            RESUMABLE_CLOSE
        };
        if let Err(e) = transport.close(code).await {
            tracing::trace!(shard_id, error = %e, "Close after end failed");
        }
        end
    }

    /// Handshake, then the steady-state loop
    async fn drive(&mut self, transport: &mut C::Transport) -> ConnectionEnd {
        let shard_id = self.shard_id();

        let interval = match self.await_hello(transport).await {
            Ok(interval) => interval,
            Err(end) => return end,
        };

        let handshake = self.machine.on_hello(interval);
        self.publish();
        let frame = match &handshake {
            Handshake::Identify => {
                tracing::debug!(shard_id, "Identifying");
                self.identify_frame()
            }
            Handshake::Resume {
                session_id,
                sequence,
            } => {
                tracing::debug!(shard_id, session_id = %session_id, seq = sequence, "Resuming");
                self.resume_frame(session_id, *sequence)
            }
        };
        match frame {
            Ok(frame) => {
                if let Err(end) = self.send(transport, &frame).await {
                    return end;
                }
            }
            Err(e) => {
                tracing::error!(shard_id, error = %e, "Failed to encode handshake");
                return ConnectionEnd::Lost(None);
            }
        }

        let mut heartbeat = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = stopped(&mut self.stop) => return ConnectionEnd::Cancelled,
                Some(command) = self.commands.recv() => {
                    if let Err(end) = self.send(transport, &command).await {
                        return end;
                    }
                }
                _ = heartbeat.tick() => match self.machine.on_heartbeat_tick() {
                    HeartbeatAction::Send(seq) => {
                        tracing::trace!(shard_id, seq = ?seq, "Heartbeat");
                        if let Err(end) = self.send(transport, &GatewayMessage::heartbeat(seq)).await {
                            return end;
                        }
                    }
                    HeartbeatAction::Zombie => {
                        tracing::warn!(shard_id, "Heartbeat not acknowledged, connection is a zombie");
                        return ConnectionEnd::Lost(None);
                    }
                },
                frame = transport.recv() => match frame {
                    None => return ConnectionEnd::Lost(None),
                    Some(Err(e)) => {
                        tracing::warn!(shard_id, error = %e, "Receive failed");
                        return ConnectionEnd::Lost(None);
                    }
                    Some(Ok(Inbound::Close(code))) => {
                        tracing::debug!(shard_id, close_code = ?code, "Gateway closed connection");
                        return ConnectionEnd::Lost(code);
                    }
                    Some(Ok(Inbound::Text(text))) => {
                        if let Err(end) = self.handle_frame(transport, &text).await {
                            return end;
                        }
                    }
                },
            }
        }
    }

    async fn await_hello(&mut self, transport: &mut C::Transport) -> Result<Duration, ConnectionEnd> {
        let shard_id = self.shard_id();
        loop {
            let frame = tokio::select! {
                frame = transport.recv() => frame,
                () = stopped(&mut self.stop) => return Err(ConnectionEnd::Cancelled),
            };
            match frame {
                None => return Err(ConnectionEnd::Lost(None)),
                Some(Err(e)) => {
                    tracing::warn!(shard_id, error = %e, "Receive failed before Hello");
                    return Err(ConnectionEnd::Lost(None));
                }
                Some(Ok(Inbound::Close(code))) => return Err(ConnectionEnd::Lost(code)),
                Some(Ok(Inbound::Text(text))) => {
                    match GatewayMessage::from_json(&text).ok().and_then(|m| m.as_hello()) {
                        Some(hello) => {
                            tracing::debug!(shard_id, heartbeat_interval = hello.heartbeat_interval, "Hello");
                            return Ok(Duration::from_millis(hello.heartbeat_interval));
                        }
                        None => tracing::debug!(shard_id, "Ignoring frame before Hello"),
                    }
                }
            }
        }
    }

    fn identify_frame(&self) -> GatewayResult<GatewayMessage> {
        let payload = IdentifyPayload {
            token: self.config.token.secret().to_string(),
            properties: IdentifyProperties::library(),
            intents: self.config.intents,
            shard: [self.config.shard_id, self.config.shard_count],
            large_threshold: self.config.large_threshold,
            compress: false,
            presence: self.config.presence.clone(),
        };
        Ok(GatewayMessage::identify(&payload)?)
    }

    fn resume_frame(&self, session_id: &str, seq: u64) -> GatewayResult<GatewayMessage> {
        let payload = ResumePayload {
            token: self.config.token.secret().to_string(),
            session_id: session_id.to_string(),
            seq,
        };
        Ok(GatewayMessage::resume(&payload)?)
    }

    async fn send(&self, transport: &mut C::Transport, message: &GatewayMessage) -> Result<(), ConnectionEnd> {
        let shard_id = self.shard_id();
        let text = message.to_json().map_err(|e| {
            tracing::error!(shard_id, error = %e, "Failed to encode frame");
            ConnectionEnd::Lost(None)
        })?;
        transport.send(text).await.map_err(|e| {
            tracing::warn!(shard_id, error = %e, "Send failed");
            ConnectionEnd::Lost(None)
        })
    }

    async fn handle_frame(&mut self, transport: &mut C::Transport, text: &str) -> Result<(), ConnectionEnd> {
        let shard_id = self.shard_id();
        let message = match GatewayMessage::from_json(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(shard_id, error = %e, "Failed to decode frame");
                return Ok(());
            }
        };

        match message.op {
            OpCode::Dispatch => self.handle_dispatch(message).await,
            OpCode::Heartbeat => {
                tracing::trace!(shard_id, "Gateway requested heartbeat");
                self.send(transport, &GatewayMessage::heartbeat(self.machine.sequence())).await
            }
            OpCode::HeartbeatAck => {
                self.machine.on_heartbeat_ack();
                Ok(())
            }
            OpCode::Reconnect => {
                tracing::info!(shard_id, "Gateway requested reconnect");
                Err(ConnectionEnd::Lost(None))
            }
            OpCode::InvalidSession => {
                let resumable = message.as_invalid_session().unwrap_or(false);
                tracing::info!(shard_id, resumable, "Invalid session");
                self.machine.on_invalid_session(resumable);
                Err(ConnectionEnd::Lost(None))
            }
            other => {
                tracing::debug!(shard_id, op = %other, "Ignoring unexpected op");
                Ok(())
            }
        }
    }

    async fn handle_dispatch(&mut self, message: GatewayMessage) -> Result<(), ConnectionEnd> {
        let shard_id = self.shard_id();
        let Some(name) = message.t else {
            tracing::warn!(shard_id, "Dispatch without event name");
            return Ok(());
        };
        if let Some(seq) = message.s {
            self.machine.on_dispatch(seq);
        }

        let event = match GatewayEvent::from_dispatch(&name, message.d.unwrap_or(Value::Null)) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(shard_id, event = %name, error = %e, "Failed to decode dispatch");
                return Ok(());
            }
        };

        if !self.belongs_here(&event) {
            tracing::warn!(shard_id, event = %name, guild_id = ?event.guild_id(), "Discarding event for another shard");
            return Ok(());
        }

        tracing::trace!(shard_id, event = %name, seq = ?message.s, "Dispatch");

        let lifecycle = match &event {
            GatewayEvent::Ready(ready) => {
                self.machine
                    .on_ready(ready.session_id.clone(), ready.resume_gateway_url.clone(), Instant::now());
                tracing::info!(shard_id, session_id = %ready.session_id, guilds = ready.guilds.len(), "Ready");
                Some(ShardEvent::Ready {
                    shard_id,
                    session_id: ready.session_id.clone(),
                })
            }
            GatewayEvent::Resumed => {
                self.machine.on_resumed(Instant::now());
                tracing::info!(shard_id, seq = ?self.machine.sequence(), "Resumed");
                Some(ShardEvent::Resumed { shard_id })
            }
            _ => None,
        };
        self.publish();

        self.emit(ShardEvent::Dispatch {
            shard_id,
            shard_count: self.config.shard_count,
            sequence: message.s,
            event,
        })
        .await?;
        if let Some(lifecycle) = lifecycle {
            self.emit(lifecycle).await?;
        }
        Ok(())
    }

    /// Whether the event could have come from this shard
    fn belongs_here(&self, event: &GatewayEvent) -> bool {
        let (id, count) = (self.config.shard_id, self.config.shard_count);
        match event {
            GatewayEvent::Ready(ready) => ready.shard.map_or(true, |shard| shard == [id, count]),
            other => other.guild_id().map_or(true, |guild_id| shard_for(guild_id, count) == id),
        }
    }
}
