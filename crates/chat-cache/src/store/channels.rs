//! Channels, flat across guilds and direct messages

use chat_core::{Channel, Snowflake};

use super::Cache;

impl Cache {
    #[must_use]
    pub fn channel(&self, id: Snowflake) -> Option<Channel> {
        self.channels.get(&id).map(|channel| channel.clone())
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Insert or replace a channel, indexing it on its guild when cached
    pub fn insert_channel(&self, channel: Channel) -> Option<Channel> {
        let id = channel.id();
        let guild_id = channel.guild_id();
        let previous = self.channels.insert(id, channel);

        if let Some(guild_id) = guild_id {
            if let Some(mut guild) = self.guilds.get_mut(&guild_id) {
                guild.channel_ids.insert(id);
            }
        }
        previous
    }

    /// Remove a channel, its guild index entry, and its cached messages
    pub fn remove_channel(&self, id: Snowflake) -> Option<Channel> {
        self.messages.remove(&id);
        let (_, channel) = self.channels.remove(&id)?;

        if let Some(guild_id) = channel.guild_id() {
            if let Some(mut guild) = self.guilds.get_mut(&guild_id) {
                guild.channel_ids.remove(&id);
            }
        }
        Some(channel)
    }

    /// Mutate a channel in place; the closure must not call back into the cache
    pub fn update_channel<F, R>(&self, id: Snowflake, f: F) -> Option<R>
    where
        F: FnOnce(&mut Channel) -> R,
    {
        self.channels.get_mut(&id).map(|mut channel| f(&mut channel))
    }

    /// Channels indexed on a guild, in id order
    #[must_use]
    pub fn guild_channels(&self, guild_id: Snowflake) -> Vec<Channel> {
        let ids = match self.guilds.get(&guild_id) {
            Some(guild) => guild.channel_ids.clone(),
            None => return Vec::new(),
        };
        ids.iter().filter_map(|id| self.channel(*id)).collect()
    }
}
