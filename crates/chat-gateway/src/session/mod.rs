//! Per-shard gateway session
//!
//! [`SessionMachine`] holds the connect/identify/heartbeat/resume/backoff
//! transitions; [`Session`] runs them against a live transport.

mod backoff;
mod runner;
mod state;

pub use backoff::BackoffPolicy;
pub use runner::{Session, SessionConfig};
pub use state::{
    Handshake, HeartbeatAction, Reconnect, SessionLimits, SessionMachine, SessionState,
};
