//! Guild emoji set replacement
//!
//! The platform sends the complete new set. Every added, changed and removed
//! emoji gets its own notification, so several changes in one event are all
//! reported.

use std::collections::HashMap;

use chat_core::{Emoji, Snowflake};
use chat_gateway::events::GuildEmojisPayload;

use super::Apply;
use crate::error::SyncResult;
use crate::notification::CacheEvent;

/// Notifications turning `old` into `new`: removals, then additions, then
/// updates, each in id order
fn diff(mut old: HashMap<Snowflake, Emoji>, new: &[Emoji]) -> Vec<CacheEvent> {
    let mut added = Vec::new();
    let mut updated = Vec::new();
    for emoji in new {
        match old.remove(&emoji.id) {
            None => added.push(CacheEvent::EmojiCreate(emoji.clone())),
            Some(previous) if previous != *emoji => updated.push(CacheEvent::EmojiUpdate {
                old: previous,
                new: emoji.clone(),
            }),
            Some(_) => {}
        }
    }

    let mut removed: Vec<_> = old.into_values().collect();
    removed.sort_by_key(|emoji| emoji.id);

    removed
        .into_iter()
        .map(CacheEvent::EmojiDelete)
        .chain(added)
        .chain(updated)
        .collect()
}

impl Apply<'_> {
    pub(super) fn guild_emojis_update(&mut self, payload: &GuildEmojisPayload) -> SyncResult<()> {
        let mut emojis = payload.to_emojis();
        emojis.sort_by_key(|emoji| emoji.id);

        let previous = match self
            .cache
            .update_guild(payload.guild_id, |g| g.replace_emojis(emojis.clone()))
        {
            Some(result) => result?,
            None => {
                self.desync("Guild", payload.guild_id);
                HashMap::new()
            }
        };

        let events = diff(previous, &emojis);
        tracing::debug!(
            shard_id = self.shard_id,
            guild_id = %payload.guild_id,
            changes = events.len(),
            "Emoji set replaced"
        );
        for event in events {
            self.emit(event);
        }
        Ok(())
    }
}
