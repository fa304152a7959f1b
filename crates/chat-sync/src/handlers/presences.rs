//! Presences and typing indicators

use chat_gateway::events::{PresencePayload, TypingStartPayload};
use chat_gateway::PayloadError;
use chrono::DateTime;

use super::Apply;
use crate::error::SyncResult;
use crate::notification::CacheEvent;

impl Apply<'_> {
    pub(super) fn presence_update(&mut self, payload: &PresencePayload) -> SyncResult<()> {
        let guild_id = payload.guild_id.ok_or(PayloadError::MissingField("guild_id"))?;
        if let Some(user) = payload.user.to_user() {
            self.cache.upsert_user(user);
        }

        let new = payload.to_presence(guild_id);
        let old = if self.cache.config().presences {
            match self.cache.upsert_presence(new.clone()) {
                Some(old) => old,
                None => {
                    self.desync("Guild", guild_id);
                    None
                }
            }
        } else {
            None
        };

        self.emit(CacheEvent::PresenceUpdate { old, new });
        Ok(())
    }

    pub(super) fn typing_start(&mut self, payload: &TypingStartPayload) -> SyncResult<()> {
        if let Some(member) = &payload.member {
            self.cache.upsert_user(member.user.to_user());
        }
        self.emit(CacheEvent::TypingStart {
            channel_id: payload.channel_id,
            guild_id: payload.guild_id,
            user_id: payload.user_id,
            timestamp: DateTime::from_timestamp(payload.timestamp, 0).unwrap_or_default(),
        });
        Ok(())
    }
}
