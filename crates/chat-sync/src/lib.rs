//! # chat-sync
//!
//! The cache synchronizer: consumes the shard manager's fan-in stream, turns
//! every event into a mutation of the entity store, and publishes a
//! [`CacheEvent`] describing what changed.
//!
//! ## Flow
//!
//! ```text
//! ShardManager ──mpsc<ShardEvent>──> CacheSynchronizer ──mutates──> Cache
//!                                          │
//!                                          └──broadcast<CacheEvent>──> subscribers
//! ```
//!
//! Events are applied one at a time in arrival order. Guild-scoped events of
//! one guild all come from the same shard, so this single consumer never sees
//! them out of order.

pub mod error;
mod handlers;
pub mod notification;
pub mod synchronizer;

pub use error::{SyncError, SyncResult};
pub use notification::CacheEvent;
pub use synchronizer::CacheSynchronizer;
