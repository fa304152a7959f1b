//! # chat-cache
//!
//! The entity store: one explicitly-owned value holding every cached entity,
//! passed by reference to whoever needs it.
//!
//! ## Layout
//!
//! - **Users**: one shared record per id, plus the session's own user
//! - **Guilds**: each guild owns its members, roles, presences and emojis
//! - **Channels**: one flat map; guild channels are indexed by id on their guild
//! - **Messages**: per-channel ordered maps, dropped together with the channel
//!
//! Maps are `DashMap`s, so readers never block each other and writers only
//! contend on the same shard of a map.
//!
//! ## Example
//!
//! ```ignore
//! use chat_cache::Cache;
//!
//! let cache = Arc::new(Cache::new(CacheConfig::default()));
//! cache.upsert_user(user);
//! let guild = cache.guild(guild_id);
//! let stats = cache.stats();
//! ```

mod snapshot;
mod store;

pub use snapshot::{CacheSnapshot, CacheStats};
pub use store::Cache;
