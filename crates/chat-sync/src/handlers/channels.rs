//! Channels, guild-scoped and direct

use chat_gateway::events::{ChannelPayload, ChannelPinsUpdatePayload};

use super::Apply;
use crate::error::SyncResult;
use crate::notification::CacheEvent;

impl Apply<'_> {
    fn store_recipients(&self, payload: &ChannelPayload) {
        for user in payload.recipient_users() {
            self.cache.upsert_user(user);
        }
    }

    pub(super) fn channel_create(&mut self, payload: &ChannelPayload) -> SyncResult<()> {
        let channel = payload.to_channel(None)?;
        self.store_recipients(payload);
        self.cache.insert_channel(channel.clone());
        self.emit(CacheEvent::ChannelCreate(channel));
        Ok(())
    }

    pub(super) fn channel_update(&mut self, payload: &ChannelPayload) -> SyncResult<()> {
        let new = payload.to_channel(None)?;
        self.store_recipients(payload);
        let old = self.cache.insert_channel(new.clone());
        if old.is_none() {
            self.desync("Channel", new.id());
        }
        self.emit(CacheEvent::ChannelUpdate { old, new });
        Ok(())
    }

    /// Remove the channel with its messages
    ///
    /// The notification falls back to the channel described on the wire when
    /// it was never cached.
    pub(super) fn channel_delete(&mut self, payload: &ChannelPayload) -> SyncResult<()> {
        let removed = self.cache.remove_channel(payload.id);
        if removed.is_none() {
            self.desync("Channel", payload.id);
        }
        let channel = removed.or_else(|| payload.to_channel(None).ok());
        self.emit(CacheEvent::ChannelDelete {
            channel_id: payload.id,
            guild_id: payload.guild_id,
            channel,
        });
        Ok(())
    }

    pub(super) fn channel_pins_update(&mut self, payload: &ChannelPinsUpdatePayload) -> SyncResult<()> {
        let updated = self
            .cache
            .update_channel(payload.channel_id, |c| c.set_last_pin_timestamp(payload.last_pin_timestamp));
        if updated.is_none() {
            self.desync("Channel", payload.channel_id);
        }
        self.emit(CacheEvent::ChannelPinsUpdate {
            channel_id: payload.channel_id,
            guild_id: payload.guild_id,
            last_pin_timestamp: payload.last_pin_timestamp,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chat_cache::Cache;
    use chat_core::{ChannelType, Snowflake};
    use serde_json::json;

    use super::super::fixtures::*;
    use crate::notification::CacheEvent;

    #[test]
    fn test_create_text_channel_10() {
        let cache = Cache::default();
        apply(&cache, "GUILD_CREATE", guild(1));

        let events = apply(&cache, "CHANNEL_CREATE", text_channel(10, 1, "news"));
        let created = events
            .iter()
            .filter(|e| matches!(e, CacheEvent::ChannelCreate(c) if c.id() == Snowflake::new(10)))
            .count();
        assert_eq!(created, 1);

        let channel = cache.channel(Snowflake::new(10)).unwrap();
        assert_eq!(channel.kind(), ChannelType::GuildText);
        assert!(cache.guild(Snowflake::new(1)).unwrap().channel_ids.contains(&Snowflake::new(10)));
    }

    #[test]
    fn test_dm_channel_stores_recipient() {
        let cache = Cache::default();
        let events = apply(
            &cache,
            "CHANNEL_CREATE",
            json!({ "id": "40", "type": 1, "recipients": [user(7)] }),
        );
        assert!(matches!(&events[..], [CacheEvent::ChannelCreate(c)] if c.guild_id().is_none()));
        assert_eq!(cache.channel(Snowflake::new(40)).unwrap().kind(), ChannelType::Dm);
        assert!(cache.user(Snowflake::new(7)).is_some());
    }

    #[test]
    fn test_update_swaps_value() {
        let cache = Cache::default();
        apply(&cache, "CHANNEL_CREATE", text_channel(10, 1, "news"));

        let events = apply(&cache, "CHANNEL_UPDATE", text_channel(10, 1, "announcements"));
        let [CacheEvent::ChannelUpdate { old: Some(old), new }] = &events[..] else {
            panic!("expected a channel update, got {events:?}");
        };
        assert_eq!(old.name(), Some("news"));
        assert_eq!(new.name(), Some("announcements"));
        assert_eq!(old.id(), new.id());
    }

    #[test]
    fn test_delete_removes_messages_and_index() {
        let cache = Cache::default();
        apply(&cache, "GUILD_CREATE", guild(1));
        apply(&cache, "CHANNEL_CREATE", text_channel(10, 1, "news"));
        apply(&cache, "MESSAGE_CREATE", message(50, 10, 100, "hello"));

        let events = apply(&cache, "CHANNEL_DELETE", text_channel(10, 1, "news"));
        assert!(matches!(&events[..], [CacheEvent::ChannelDelete { channel: Some(_), .. }]));
        assert!(cache.channel(Snowflake::new(10)).is_none());
        assert!(cache.messages(Snowflake::new(10)).is_empty());
        assert!(!cache.guild(Snowflake::new(1)).unwrap().channel_ids.contains(&Snowflake::new(10)));
    }

    #[test]
    fn test_pins_update_sets_timestamp() {
        let cache = Cache::default();
        apply(&cache, "CHANNEL_CREATE", text_channel(10, 1, "news"));
        apply(
            &cache,
            "CHANNEL_PINS_UPDATE",
            json!({ "channel_id": "10", "last_pin_timestamp": "2024-02-01T00:00:00Z" }),
        );
        assert!(cache.channel(Snowflake::new(10)).unwrap().last_pin_timestamp().is_some());
    }
}
