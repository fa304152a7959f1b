//! Sharding
//!
//! Deterministic guild routing, the shared identify gate, and the manager
//! that runs and fans in every shard's session.

mod event;
mod identify;
mod manager;
mod routing;

pub use event::ShardEvent;
pub use identify::IdentifyGate;
pub use manager::ShardManager;
pub use routing::shard_for;
