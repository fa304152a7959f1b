//! Member entity - a user's membership in a guild

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Guild member entity (junction between User and Guild)
///
/// Exactly one member exists per (guild, user) pair; the user record itself
/// lives in the shared user store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildMember {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub nickname: Option<String>,
    pub role_ids: Vec<Snowflake>,
    pub joined_at: Option<DateTime<Utc>>,
    pub premium_since: Option<DateTime<Utc>>,
    pub deaf: bool,
    pub mute: bool,
    pub pending: bool,
}

impl GuildMember {
    /// Create a new GuildMember
    #[must_use]
    pub fn new(guild_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            guild_id,
            user_id,
            nickname: None,
            role_ids: Vec::new(),
            joined_at: None,
            premium_since: None,
            deaf: false,
            mute: false,
            pending: false,
        }
    }

    /// Get display name (nickname if set, otherwise fallback)
    pub fn display_name<'a>(&'a self, username: &'a str) -> &'a str {
        self.nickname.as_deref().unwrap_or(username)
    }

    /// Check if member has a specific role
    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.role_ids.contains(&role_id)
    }

    /// Drop a role from the member, returning whether it was present
    pub fn remove_role(&mut self, role_id: Snowflake) -> bool {
        let before = self.role_ids.len();
        self.role_ids.retain(|&id| id != role_id);
        before != self.role_ids.len()
    }
}
