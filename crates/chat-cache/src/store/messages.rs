//! Per-channel message cache

use std::collections::BTreeMap;

use chat_core::{DomainError, Message, Snowflake};

use super::Cache;

impl Cache {
    #[must_use]
    pub fn message(&self, channel_id: Snowflake, message_id: Snowflake) -> Option<Message> {
        self.messages
            .get(&channel_id)
            .and_then(|messages| messages.get(&message_id).cloned())
    }

    /// Cached messages of a channel, oldest first
    #[must_use]
    pub fn messages(&self, channel_id: Snowflake) -> Vec<Message> {
        self.messages
            .get(&channel_id)
            .map(|messages| messages.values().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.iter().map(|entry| entry.value().len()).sum()
    }

    /// Store a message and advance its channel's last message id
    ///
    /// The channel must be cached. With message caching disabled only the
    /// channel is touched.
    pub fn insert_message(&self, message: Message) -> Result<Option<Message>, DomainError> {
        let channel_id = message.channel_id;
        let message_id = message.id;

        self.update_channel(channel_id, |channel| {
            if channel.last_message_id().map_or(true, |last| last < message_id) {
                channel.set_last_message_id(message_id);
            }
        })
        .ok_or(DomainError::ChannelNotFound(channel_id))?;

        if !self.config.messages {
            return Ok(None);
        }
        Ok(self
            .messages
            .entry(channel_id)
            .or_insert_with(BTreeMap::new)
            .insert(message_id, message))
    }

    /// Mutate a cached message; the closure must not call back into the cache
    pub fn update_message<F, R>(&self, channel_id: Snowflake, message_id: Snowflake, f: F) -> Option<R>
    where
        F: FnOnce(&mut Message) -> R,
    {
        let mut messages = self.messages.get_mut(&channel_id)?;
        messages.get_mut(&message_id).map(f)
    }

    pub fn remove_message(&self, channel_id: Snowflake, message_id: Snowflake) -> Option<Message> {
        self.messages
            .get_mut(&channel_id)
            .and_then(|mut messages| messages.remove(&message_id))
    }
}
