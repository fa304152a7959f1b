//! READY, guild lifecycle and bans

use std::collections::HashSet;

use chat_gateway::events::{GuildBanPayload, GuildPayload, ReadyPayload, UnavailableGuildPayload};
use chat_gateway::shard_for;

use super::Apply;
use crate::error::SyncResult;
use crate::notification::CacheEvent;

impl Apply<'_> {
    /// Record the current user and the guilds whose snapshots will follow
    ///
    /// Guilds of this shard that the fresh session no longer lists are dropped.
    pub(super) fn ready(&mut self, ready: &ReadyPayload) -> SyncResult<()> {
        let user = ready.user.to_user();
        self.cache.set_current_user(user.clone());

        let listed: HashSet<_> = ready.guilds.iter().map(|g| g.id).collect();
        for guild_id in self.cache.guild_ids() {
            if shard_for(guild_id, self.shard_count) == self.shard_id && !listed.contains(&guild_id) {
                let guild = self.cache.remove_guild(guild_id);
                tracing::debug!(shard_id = self.shard_id, guild_id = %guild_id, "Dropping guild missing from READY");
                self.emit(CacheEvent::GuildRemove { guild_id, guild });
            }
        }

        let mut unavailable = Vec::with_capacity(ready.guilds.len());
        for guild in &ready.guilds {
            self.cache.mark_unavailable(guild.id);
            unavailable.push(guild.id);
        }

        tracing::info!(
            shard_id = self.shard_id,
            user_id = %user.id,
            guilds = unavailable.len(),
            "Session ready"
        );
        self.emit(CacheEvent::Ready {
            shard_id: self.shard_id,
            user,
            unavailable_guilds: unavailable,
        });
        Ok(())
    }

    /// Store a full snapshot; users first, then channels, then the guild
    pub(super) fn guild_create(&mut self, payload: &GuildPayload) -> SyncResult<()> {
        if payload.unavailable {
            if self.cache.mark_unavailable(payload.id) {
                self.emit(CacheEvent::GuildUnavailable { guild_id: payload.id });
            }
            return Ok(());
        }

        let was_unavailable = self.cache.is_unavailable(payload.id);
        let snapshot = payload.to_snapshot()?;
        for user in snapshot.users {
            self.cache.upsert_user(user);
        }

        let guild_id = snapshot.guild.id;
        self.cache.insert_guild_snapshot(snapshot.guild.clone(), snapshot.channels);
        let guild = self.cache.guild(guild_id).unwrap_or(snapshot.guild);

        tracing::debug!(
            shard_id = self.shard_id,
            guild_id = %guild_id,
            members = guild.members.len(),
            channels = guild.channel_ids.len(),
            was_unavailable,
            "Guild snapshot applied"
        );
        if was_unavailable {
            self.emit(CacheEvent::GuildAvailable(guild));
        } else {
            self.emit(CacheEvent::GuildJoined(guild));
        }
        Ok(())
    }

    /// Replace the guild's own fields, keeping what other events accumulated
    pub(super) fn guild_update(&mut self, payload: &GuildPayload) -> SyncResult<()> {
        let mut new = payload.to_snapshot()?.guild;
        let old = self.cache.guild(payload.id);
        match &old {
            Some(old) => new = new.with_collections_from(old),
            None => self.desync("Guild", payload.id),
        }

        self.cache.insert_guild(new.clone());
        self.emit(CacheEvent::GuildUpdate { old, new });
        Ok(())
    }

    /// Either an outage or the client leaving the guild
    pub(super) fn guild_delete(&mut self, payload: &UnavailableGuildPayload) -> SyncResult<()> {
        let guild_id = payload.id;
        if payload.unavailable {
            tracing::info!(shard_id = self.shard_id, guild_id = %guild_id, "Guild unavailable");
            if self.cache.mark_unavailable(guild_id) {
                self.emit(CacheEvent::GuildUnavailable { guild_id });
            }
            return Ok(());
        }

        let guild = self.cache.remove_guild(guild_id);
        if guild.is_none() {
            self.desync("Guild", guild_id);
        }
        self.emit(CacheEvent::GuildRemove { guild_id, guild });
        Ok(())
    }

    pub(super) fn guild_ban(&mut self, payload: &GuildBanPayload, added: bool) -> SyncResult<()> {
        let user = payload.user.to_user();
        self.cache.upsert_user(user.clone());

        let guild_id = payload.guild_id;
        self.emit(if added {
            CacheEvent::BanAdd { guild_id, user }
        } else {
            CacheEvent::BanRemove { guild_id, user }
        });
        Ok(())
    }
}
