//! Reaction aggregates on cached messages
//!
//! Reactions on messages the store never saw change nothing; their
//! notifications carry only the identifiers.

use chat_gateway::events::{ReactionPayload, ReactionRemoveAllPayload};

use super::Apply;
use crate::error::SyncResult;
use crate::notification::CacheEvent;

impl Apply<'_> {
    fn refresh_reactor(&self, payload: &ReactionPayload) {
        if let Some(member) = &payload.member {
            self.cache.upsert_user(member.user.to_user());
        }
    }

    pub(super) fn reaction_add(&mut self, payload: &ReactionPayload) -> SyncResult<()> {
        self.refresh_reactor(payload);
        let emoji = payload.emoji.to_emoji();
        let by_me = self.cache.current_user_id() == Some(payload.user_id);

        let message = self
            .cache
            .update_message(payload.channel_id, payload.message_id, |m| {
                m.add_reaction(emoji.clone(), by_me);
                m.clone()
            });
        if message.is_none() {
            tracing::trace!(shard_id = self.shard_id, message_id = %payload.message_id, "Reaction on uncached message");
        }

        self.emit(CacheEvent::ReactionAdd {
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            guild_id: payload.guild_id,
            user_id: payload.user_id,
            emoji,
            message,
        });
        Ok(())
    }

    pub(super) fn reaction_remove(&mut self, payload: &ReactionPayload) -> SyncResult<()> {
        let emoji = payload.emoji.to_emoji();
        let key = emoji.key();
        let by_me = self.cache.current_user_id() == Some(payload.user_id);

        let message = self
            .cache
            .update_message(payload.channel_id, payload.message_id, |m| {
                m.remove_reaction(&key, by_me);
                m.clone()
            });

        self.emit(CacheEvent::ReactionRemove {
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            guild_id: payload.guild_id,
            user_id: payload.user_id,
            emoji,
            message,
        });
        Ok(())
    }

    pub(super) fn reaction_remove_all(&mut self, payload: &ReactionRemoveAllPayload) -> SyncResult<()> {
        let cleared = self
            .cache
            .update_message(payload.channel_id, payload.message_id, |m| {
                let removed: Vec<_> = m.clear_reactions().into_values().collect();
                (m.clone(), removed)
            });
        let (message, removed) = match cleared {
            Some((message, removed)) => (Some(message), removed),
            None => (None, Vec::new()),
        };

        self.emit(CacheEvent::ReactionRemoveAll {
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            guild_id: payload.guild_id,
            removed,
            message,
        });
        Ok(())
    }
}
