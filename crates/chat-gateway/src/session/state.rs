//! Session state machine
//!
//! Every connect, identify, resume and backoff decision lives here as a plain
//! transition. The async runner only performs the I/O each transition asks for.

use super::BackoffPolicy;
use crate::protocol::CloseCode;
use std::fmt;
use std::time::{Duration, Instant};

/// Where a Session is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    /// Connection opening; waiting for Hello
    Connecting,
    /// Identify sent; waiting for READY
    Identifying,
    /// Resume sent; waiting for RESUMED
    Resuming,
    /// Steady state, with the last sequence observed
    Connected { sequence: u64 },
    /// Waiting before reconnect attempt `attempt`
    Backoff { attempt: u32 },
}

impl SessionState {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Identifying => f.write_str("identifying"),
            Self::Resuming => f.write_str("resuming"),
            Self::Connected { sequence } => write!(f, "connected(seq={sequence})"),
            Self::Backoff { attempt } => write!(f, "backoff({attempt})"),
        }
    }
}

/// What to send after Hello
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handshake {
    Identify,
    Resume { session_id: String, sequence: u64 },
}

/// What to do at a heartbeat tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatAction {
    /// Send a heartbeat carrying this sequence
    Send(Option<u64>),
    /// The previous heartbeat was never acknowledged
    Zombie,
}

/// What to do after the connection is gone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconnect {
    /// Wait `delay`, then reconnect; `resume` says whether a session survives
    Retry {
        delay: Duration,
        attempt: u32,
        resume: bool,
    },
    /// The close code forbids reconnecting
    Stop(CloseCode),
}

/// Session limits taken from configuration
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub backoff: BackoffPolicy,
    /// Failed resumes tolerated before identifying again
    pub max_resume_attempts: u32,
    /// Connected time after which the backoff counter resets
    pub sustained_connection: Duration,
}

/// Pure per-shard state machine
#[derive(Debug, Clone)]
pub struct SessionMachine {
    limits: SessionLimits,
    state: SessionState,
    session_id: Option<String>,
    sequence: Option<u64>,
    resume_url: Option<String>,
    heartbeat_interval: Option<Duration>,
    awaiting_ack: bool,
    /// The current connection attempt is meant to resume
    resume_attempt: bool,
    resume_failures: u32,
    backoff_attempt: u32,
    connected_since: Option<Instant>,
}

impl SessionMachine {
    #[must_use]
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            limits,
            state: SessionState::Disconnected,
            session_id: None,
            sequence: None,
            resume_url: None,
            heartbeat_interval: None,
            awaiting_ack: false,
            resume_attempt: false,
            resume_failures: 0,
            backoff_attempt: 0,
            connected_since: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.sequence
    }

    #[must_use]
    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.heartbeat_interval
    }

    #[must_use]
    pub fn resume_failures(&self) -> u32 {
        self.resume_failures
    }

    /// Whether the next handshake will try to resume
    #[must_use]
    pub fn can_resume(&self) -> bool {
        self.session_id.is_some() && self.sequence.is_some()
    }

    /// URL for the next connection: the resume URL while a session survives
    #[must_use]
    pub fn connect_url<'a>(&'a self, default: &'a str) -> &'a str {
        match &self.resume_url {
            Some(url) if self.can_resume() => url,
            _ => default,
        }
    }

    fn clear_session(&mut self) {
        self.session_id = None;
        self.sequence = None;
        self.resume_url = None;
        self.resume_failures = 0;
    }

    /// A new connection is being opened
    pub fn begin_connect(&mut self) {
        self.state = SessionState::Connecting;
        self.resume_attempt = self.can_resume();
        self.awaiting_ack = false;
        self.heartbeat_interval = None;
    }

    /// Hello received: remember the interval and pick identify or resume
    pub fn on_hello(&mut self, interval: Duration) -> Handshake {
        self.heartbeat_interval = Some(interval);
        match (&self.session_id, self.sequence) {
            (Some(session_id), Some(sequence)) => {
                self.state = SessionState::Resuming;
                Handshake::Resume {
                    session_id: session_id.clone(),
                    sequence,
                }
            }
            _ => {
                self.state = SessionState::Identifying;
                Handshake::Identify
            }
        }
    }

    /// Record the sequence number of a dispatch frame
    pub fn on_dispatch(&mut self, sequence: u64) {
        let latest = self.sequence.map_or(sequence, |s| s.max(sequence));
        self.sequence = Some(latest);
        if let SessionState::Connected { sequence } = &mut self.state {
            *sequence = latest;
        }
    }

    /// READY received: a fresh session is established
    pub fn on_ready(&mut self, session_id: String, resume_url: Option<String>, now: Instant) {
        self.session_id = Some(session_id);
        self.resume_url = resume_url;
        self.resume_attempt = false;
        self.resume_failures = 0;
        self.connected_since = Some(now);
        self.state = SessionState::Connected {
            sequence: self.sequence.unwrap_or(0),
        };
    }

    /// RESUMED received: replay finished, session continues
    pub fn on_resumed(&mut self, now: Instant) {
        self.resume_attempt = false;
        self.resume_failures = 0;
        self.connected_since = Some(now);
        self.state = SessionState::Connected {
            sequence: self.sequence.unwrap_or(0),
        };
    }

    /// Heartbeat timer fired
    pub fn on_heartbeat_tick(&mut self) -> HeartbeatAction {
        if self.awaiting_ack {
            return HeartbeatAction::Zombie;
        }
        self.awaiting_ack = true;
        HeartbeatAction::Send(self.sequence)
    }

    pub fn on_heartbeat_ack(&mut self) {
        self.awaiting_ack = false;
    }

    /// Invalid Session received; a non-resumable one forgets the session
    pub fn on_invalid_session(&mut self, resumable: bool) {
        if !resumable {
            self.clear_session();
        }
    }

    /// The connection is gone, or could not be opened
    pub fn on_connection_lost(&mut self, close_code: Option<u16>, now: Instant) -> Reconnect {
        let code = close_code.and_then(CloseCode::from_u16);
        self.awaiting_ack = false;

        if let Some(code) = code.filter(|c| c.is_fatal()) {
            self.resume_attempt = false;
            self.clear_session();
            self.connected_since = None;
            self.state = SessionState::Disconnected;
            return Reconnect::Stop(code);
        }

        if code.is_some_and(CloseCode::requires_identify) {
            self.clear_session();
        }

        // Counted whether the attempt died before or after Hello
        if std::mem::take(&mut self.resume_attempt) && self.can_resume() {
            self.resume_failures += 1;
            if self.resume_failures >= self.limits.max_resume_attempts {
                self.clear_session();
            }
        }

        if let Some(since) = self.connected_since.take() {
            if now.saturating_duration_since(since) >= self.limits.sustained_connection {
                self.backoff_attempt = 0;
            }
        }

        let attempt = self.backoff_attempt;
        self.backoff_attempt = self.backoff_attempt.saturating_add(1);
        self.state = SessionState::Backoff { attempt };

        Reconnect::Retry {
            delay: self.limits.backoff.delay_for_attempt(attempt),
            attempt,
            resume: self.can_resume(),
        }
    }

    /// Explicit disconnect: abandon the session entirely
    pub fn disconnect(&mut self) {
        self.clear_session();
        self.awaiting_ack = false;
        self.resume_attempt = false;
        self.connected_since = None;
        self.heartbeat_interval = None;
        self.state = SessionState::Disconnected;
    }
}
