//! The `Cache` value and its per-entity operations
//!
//! Each submodule adds one `impl Cache` block. No method holds a map guard
//! while touching a second entry of the same map.

mod channels;
mod guilds;
mod messages;
mod users;

use std::collections::BTreeMap;

use chat_common::CacheConfig;
use chat_core::{Channel, Guild, Message, Snowflake, User};
use dashmap::{DashMap, DashSet};
use parking_lot::RwLock;

use crate::snapshot::{CacheSnapshot, CacheStats};

/// In-memory entity store
#[derive(Debug, Default)]
pub struct Cache {
    config: CacheConfig,
    users: DashMap<Snowflake, User>,
    current_user: RwLock<Option<User>>,
    guilds: DashMap<Snowflake, Guild>,
    unavailable_guilds: DashSet<Snowflake>,
    channels: DashMap<Snowflake, Channel>,
    messages: DashMap<Snowflake, BTreeMap<Snowflake, Message>>,
}

impl Cache {
    /// Create an empty store
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Ordered copy of everything in the store
    #[must_use]
    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            current_user: self.current_user(),
            users: collect(&self.users),
            guilds: collect(&self.guilds),
            unavailable_guilds: self.unavailable_guilds.iter().map(|id| *id).collect(),
            channels: collect(&self.channels),
            messages: self
                .messages
                .iter()
                .filter(|entry| !entry.value().is_empty())
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect(),
        }
    }

    /// Entry counts per map
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            users: self.users.len(),
            guilds: self.guilds.len(),
            unavailable_guilds: self.unavailable_guilds.len(),
            channels: self.channels.len(),
            messages: self.messages.iter().map(|entry| entry.value().len()).sum(),
            ..CacheStats::default()
        };
        for guild in &self.guilds {
            stats.members += guild.members.len();
            stats.roles += guild.roles.len();
            stats.presences += guild.presences.len();
            stats.emojis += guild.emojis.len();
        }
        stats
    }

    /// Drop everything, e.g. before a fresh identify replaces the session
    pub fn clear(&self) {
        self.messages.clear();
        self.channels.clear();
        self.guilds.clear();
        self.unavailable_guilds.clear();
        self.users.clear();
        *self.current_user.write() = None;
        tracing::debug!("Cleared entity store");
    }
}

fn collect<V: Clone>(map: &DashMap<Snowflake, V>) -> BTreeMap<Snowflake, V> {
    map.iter()
        .map(|entry| (*entry.key(), entry.value().clone()))
        .collect()
}
