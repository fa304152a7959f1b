//! Guild entity - the container for members, roles, presences and emojis
//!
//! A guild exclusively owns its nested maps; they go away with it. Its
//! channels live in the shared channel store and are only indexed here by id.

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};

use super::{Emoji, GuildMember, Presence, Role};
use crate::error::DomainError;
use crate::value_objects::{Permissions, Snowflake};

/// Guild entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    pub icon: Option<String>,
    pub owner_id: Snowflake,
    /// Set while the guild is in an outage; such guilds carry no other data
    pub unavailable: bool,
    pub member_count: u64,
    pub large: bool,
    pub joined_at: Option<DateTime<Utc>>,
    pub channel_ids: BTreeSet<Snowflake>,
    pub members: HashMap<Snowflake, GuildMember>,
    pub roles: HashMap<Snowflake, Role>,
    pub presences: HashMap<Snowflake, Presence>,
    pub emojis: HashMap<Snowflake, Emoji>,
}

impl Guild {
    /// Create a new Guild
    #[must_use]
    pub fn new(id: Snowflake, name: String, owner_id: Snowflake) -> Self {
        Self {
            id,
            name,
            icon: None,
            owner_id,
            unavailable: false,
            member_count: 0,
            large: false,
            joined_at: None,
            channel_ids: BTreeSet::new(),
            members: HashMap::new(),
            roles: HashMap::new(),
            presences: HashMap::new(),
            emojis: HashMap::new(),
        }
    }

    /// Placeholder for a guild the platform reports as unavailable
    #[must_use]
    pub fn unavailable(id: Snowflake) -> Self {
        let mut guild = Self::new(id, String::new(), Snowflake::default());
        guild.unavailable = true;
        guild
    }

    /// Check if user is the guild owner
    #[inline]
    #[must_use]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }

    #[must_use]
    pub fn member(&self, user_id: Snowflake) -> Option<&GuildMember> {
        self.members.get(&user_id)
    }

    #[must_use]
    pub fn role(&self, role_id: Snowflake) -> Option<&Role> {
        self.roles.get(&role_id)
    }

    /// The @everyone role, whose id equals the guild id
    #[must_use]
    pub fn everyone_role(&self) -> Option<&Role> {
        self.roles.get(&self.id)
    }

    fn check_owner(&self, kind: &'static str, id: Snowflake, actual: Snowflake) -> Result<(), DomainError> {
        if actual == self.id {
            Ok(())
        } else {
            Err(DomainError::GuildMismatch {
                kind,
                id,
                expected: self.id,
                actual,
            })
        }
    }

    /// Insert or replace a member, returning the previous value
    pub fn insert_member(&mut self, member: GuildMember) -> Result<Option<GuildMember>, DomainError> {
        self.check_owner("Member", member.user_id, member.guild_id)?;
        Ok(self.members.insert(member.user_id, member))
    }

    pub fn remove_member(&mut self, user_id: Snowflake) -> Option<GuildMember> {
        self.presences.remove(&user_id);
        self.members.remove(&user_id)
    }

    /// Insert or replace a role, returning the previous value
    pub fn insert_role(&mut self, role: Role) -> Result<Option<Role>, DomainError> {
        self.check_owner("Role", role.id, role.guild_id)?;
        Ok(self.roles.insert(role.id, role))
    }

    /// Remove a role and strip it from every member that held it
    pub fn remove_role(&mut self, role_id: Snowflake) -> Option<Role> {
        let removed = self.roles.remove(&role_id);
        for member in self.members.values_mut() {
            member.remove_role(role_id);
        }
        removed
    }

    /// Insert or replace a presence, returning the previous value
    pub fn insert_presence(&mut self, presence: Presence) -> Result<Option<Presence>, DomainError> {
        self.check_owner("Presence", presence.user_id, presence.guild_id)?;
        Ok(self.presences.insert(presence.user_id, presence))
    }

    /// Insert or replace an emoji, returning the previous value
    pub fn insert_emoji(&mut self, emoji: Emoji) -> Result<Option<Emoji>, DomainError> {
        self.check_owner("Emoji", emoji.id, emoji.guild_id)?;
        Ok(self.emojis.insert(emoji.id, emoji))
    }

    /// Swap in a complete emoji set, returning the previous one
    pub fn replace_emojis(&mut self, emojis: Vec<Emoji>) -> Result<HashMap<Snowflake, Emoji>, DomainError> {
        let mut next = HashMap::with_capacity(emojis.len());
        for emoji in emojis {
            self.check_owner("Emoji", emoji.id, emoji.guild_id)?;
            next.insert(emoji.id, emoji);
        }
        Ok(std::mem::replace(&mut self.emojis, next))
    }

    /// Carry the locally accumulated state of `previous` into a freshly
    /// decoded update, which only describes the guild's own fields
    #[must_use]
    pub fn with_collections_from(mut self, previous: &Guild) -> Self {
        self.channel_ids = previous.channel_ids.clone();
        self.members = previous.members.clone();
        self.presences = previous.presences.clone();
        if self.roles.is_empty() {
            self.roles = previous.roles.clone();
        }
        if self.emojis.is_empty() {
            self.emojis = previous.emojis.clone();
        }
        if self.joined_at.is_none() {
            self.joined_at = previous.joined_at;
        }
        if self.member_count == 0 {
            self.member_count = previous.member_count;
        }
        self.large = self.large || previous.large;
        self
    }

    /// Effective guild-level permissions of a member
    ///
    /// The owner holds every permission; everyone else gets the union of
    /// @everyone and their own roles.
    pub fn member_permissions(&self, user_id: Snowflake) -> Result<Permissions, DomainError> {
        if self.is_owner(user_id) {
            return Ok(Permissions::all());
        }
        let member = self.members.get(&user_id).ok_or(DomainError::MemberNotFound {
            guild_id: self.id,
            user_id,
        })?;

        let everyone = self.everyone_role().map(|role| role.permissions);
        let own = member
            .role_ids
            .iter()
            .filter_map(|id| self.roles.get(id))
            .map(|role| role.permissions);

        Ok(Permissions::combine(everyone.into_iter().chain(own)))
    }
}
