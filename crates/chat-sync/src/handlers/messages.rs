//! Messages

use chat_core::Message;
use chat_gateway::events::{
    MessageDeleteBulkPayload, MessageDeletePayload, MessagePayload, MessageUpdatePayload,
};

use super::Apply;
use crate::error::SyncResult;
use crate::notification::CacheEvent;

impl Apply<'_> {
    /// Cache a message under its channel; an unknown channel is a desync
    fn store(&self, message: &Message) {
        if self.cache.insert_message(message.clone()).is_err() {
            self.desync("Channel", message.channel_id);
        }
    }

    pub(super) fn message_create(&mut self, payload: &MessagePayload) -> SyncResult<()> {
        for user in payload.users() {
            self.cache.upsert_user(user);
        }
        let message = payload.to_message();
        self.store(&message);
        self.emit(CacheEvent::MessageCreate(message));
        Ok(())
    }

    /// Rebuild the message from the cached copy and the edited fields
    ///
    /// Without a cached copy the payload has to carry a whole message;
    /// otherwise consumers get the raw edit.
    pub(super) fn message_update(&mut self, payload: Box<MessageUpdatePayload>) -> SyncResult<()> {
        for user in payload.users() {
            self.cache.upsert_user(user);
        }

        let old = self.cache.message(payload.channel_id, payload.id);
        let new = match &old {
            Some(old) => payload.apply_to(old),
            None => {
                self.desync("Message", payload.id);
                match payload.to_message() {
                    Some(message) => message,
                    None => {
                        self.emit(CacheEvent::RawMessageUpdate(payload));
                        return Ok(());
                    }
                }
            }
        };

        self.store(&new);
        self.emit(CacheEvent::MessageUpdate { old, new });
        Ok(())
    }

    pub(super) fn message_delete(&mut self, payload: &MessageDeletePayload) -> SyncResult<()> {
        let message = self.cache.remove_message(payload.channel_id, payload.id);
        if message.is_none() {
            self.desync("Message", payload.id);
        }
        self.emit(CacheEvent::MessageDelete {
            message_id: payload.id,
            channel_id: payload.channel_id,
            guild_id: payload.guild_id,
            message,
        });
        Ok(())
    }

    pub(super) fn message_delete_bulk(&mut self, payload: &MessageDeleteBulkPayload) -> SyncResult<()> {
        let mut messages = Vec::with_capacity(payload.ids.len());
        for id in &payload.ids {
            match self.cache.remove_message(payload.channel_id, *id) {
                Some(message) => messages.push(message),
                None => self.desync("Message", *id),
            }
        }
        self.emit(CacheEvent::MessageDeleteBulk {
            message_ids: payload.ids.clone(),
            channel_id: payload.channel_id,
            guild_id: payload.guild_id,
            messages,
        });
        Ok(())
    }
}
