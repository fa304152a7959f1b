//! Guilds and everything they own

use chat_core::{Channel, Emoji, Guild, GuildMember, Presence, Role, Snowflake};

use super::Cache;

impl Cache {
    #[must_use]
    pub fn guild(&self, id: Snowflake) -> Option<Guild> {
        self.guilds.get(&id).map(|guild| guild.clone())
    }

    #[must_use]
    pub fn contains_guild(&self, id: Snowflake) -> bool {
        self.guilds.contains_key(&id)
    }

    #[must_use]
    pub fn guild_ids(&self) -> Vec<Snowflake> {
        let mut ids: Vec<_> = self.guilds.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    /// Whether the platform last reported this guild as being in an outage
    #[must_use]
    pub fn is_unavailable(&self, id: Snowflake) -> bool {
        self.unavailable_guilds.contains(&id)
    }

    /// Insert or replace a guild, clearing any outage marker
    pub fn insert_guild(&self, mut guild: Guild) -> Option<Guild> {
        if !self.config.presences {
            guild.presences.clear();
        }
        self.unavailable_guilds.remove(&guild.id);
        self.guilds.insert(guild.id, guild)
    }

    /// Insert a full guild snapshot together with its channels
    ///
    /// Channels are stored first and the guild last, so no reader sees the
    /// guild before the channels it indexes. Channels a previous snapshot of
    /// the same guild listed but this one does not are dropped.
    pub fn insert_guild_snapshot(&self, mut guild: Guild, channels: Vec<Channel>) -> Option<Guild> {
        for channel in channels {
            guild.channel_ids.insert(channel.id());
            self.channels.insert(channel.id(), channel);
        }

        let previous = self.insert_guild(guild.clone());
        if let Some(previous) = &previous {
            for stale in previous.channel_ids.difference(&guild.channel_ids) {
                self.channels.remove(stale);
                self.messages.remove(stale);
            }
        }

        tracing::debug!(
            guild_id = %guild.id,
            channels = guild.channel_ids.len(),
            members = guild.members.len(),
            "Stored guild snapshot"
        );
        previous
    }

    /// Remove a guild along with its channels and their messages
    pub fn remove_guild(&self, id: Snowflake) -> Option<Guild> {
        self.unavailable_guilds.remove(&id);
        let (_, guild) = self.guilds.remove(&id)?;
        for channel_id in &guild.channel_ids {
            self.channels.remove(channel_id);
            self.messages.remove(channel_id);
        }
        Some(guild)
    }

    /// Flag a guild as unavailable, keeping whatever was cached for it
    ///
    /// Returns `true` when the guild was not already flagged.
    pub fn mark_unavailable(&self, id: Snowflake) -> bool {
        if let Some(mut guild) = self.guilds.get_mut(&id) {
            guild.unavailable = true;
        }
        self.unavailable_guilds.insert(id)
    }

    /// Mutate a guild in place
    ///
    /// The closure runs under the guild's map guard and must not call back
    /// into the cache.
    pub fn update_guild<F, R>(&self, id: Snowflake, f: F) -> Option<R>
    where
        F: FnOnce(&mut Guild) -> R,
    {
        self.guilds.get_mut(&id).map(|mut guild| f(&mut guild))
    }

    #[must_use]
    pub fn member(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<GuildMember> {
        self.guilds
            .get(&guild_id)
            .and_then(|guild| guild.members.get(&user_id).cloned())
    }

    #[must_use]
    pub fn role(&self, guild_id: Snowflake, role_id: Snowflake) -> Option<Role> {
        self.guilds
            .get(&guild_id)
            .and_then(|guild| guild.roles.get(&role_id).cloned())
    }

    #[must_use]
    pub fn emoji(&self, guild_id: Snowflake, emoji_id: Snowflake) -> Option<Emoji> {
        self.guilds
            .get(&guild_id)
            .and_then(|guild| guild.emojis.get(&emoji_id).cloned())
    }

    #[must_use]
    pub fn presence(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Presence> {
        self.guilds
            .get(&guild_id)
            .and_then(|guild| guild.presences.get(&user_id).cloned())
    }

    /// Store a presence unless presence caching is disabled
    ///
    /// Returns `None` for the inner value when nothing was stored before.
    pub fn upsert_presence(&self, presence: Presence) -> Option<Option<Presence>> {
        if !self.config.presences {
            return None;
        }
        self.update_guild(presence.guild_id, |guild| {
            guild.presences.insert(presence.user_id, presence)
        })
    }
}
