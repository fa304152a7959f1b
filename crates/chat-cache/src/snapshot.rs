//! Point-in-time views of the store

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chat_core::{Channel, Guild, Message, Snowflake, User};

/// Ordered copy of the whole store
///
/// Two stores that hold the same entities compare equal regardless of the
/// order in which they were filled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheSnapshot {
    pub current_user: Option<User>,
    pub users: BTreeMap<Snowflake, User>,
    pub guilds: BTreeMap<Snowflake, Guild>,
    pub unavailable_guilds: BTreeSet<Snowflake>,
    pub channels: BTreeMap<Snowflake, Channel>,
    pub messages: BTreeMap<Snowflake, BTreeMap<Snowflake, Message>>,
}

/// Entry counts per map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub users: usize,
    pub guilds: usize,
    pub unavailable_guilds: usize,
    pub channels: usize,
    pub messages: usize,
    pub members: usize,
    pub roles: usize,
    pub presences: usize,
    pub emojis: usize,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} guilds ({} unavailable), {} channels, {} messages, {} users, {} members",
            self.guilds,
            self.unavailable_guilds,
            self.channels,
            self.messages,
            self.users,
            self.members
        )
    }
}
