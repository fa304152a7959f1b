//! Guild members

use chat_gateway::events::{GuildMemberRemovePayload, GuildMembersChunkPayload, MemberPayload};

use super::Apply;
use crate::error::SyncResult;
use crate::notification::CacheEvent;

impl Apply<'_> {
    pub(super) fn member_add(&mut self, payload: &MemberPayload) -> SyncResult<()> {
        let guild_id = payload.require_guild_id()?;
        self.cache.upsert_user(payload.user.to_user());

        let member = payload.to_member(guild_id);
        let stored = self.cache.update_guild(guild_id, |guild| {
            let previous = guild.insert_member(member.clone())?;
            if previous.is_none() {
                guild.member_count += 1;
            }
            Ok::<_, chat_core::DomainError>(())
        });
        match stored {
            Some(result) => result?,
            None => self.desync("Guild", guild_id),
        }

        self.emit(CacheEvent::MemberAdd(member));
        Ok(())
    }

    /// Replace the member wholesale with the value the payload describes
    pub(super) fn member_update(&mut self, payload: &MemberPayload) -> SyncResult<()> {
        let guild_id = payload.require_guild_id()?;
        self.cache.upsert_user(payload.user.to_user());

        let new = payload.to_member(guild_id);
        let old = self
            .cache
            .update_guild(guild_id, |guild| guild.insert_member(new.clone()))
            .transpose()?
            .flatten();
        if old.is_none() {
            self.desync("Member", new.user_id);
        }

        self.emit(CacheEvent::MemberUpdate { old, new });
        Ok(())
    }

    pub(super) fn member_remove(&mut self, payload: &GuildMemberRemovePayload) -> SyncResult<()> {
        let guild_id = payload.guild_id;
        let user = payload.user.to_user();
        self.cache.upsert_user(user.clone());

        let member = self
            .cache
            .update_guild(guild_id, |guild| {
                let removed = guild.remove_member(user.id);
                if removed.is_some() {
                    guild.member_count = guild.member_count.saturating_sub(1);
                }
                removed
            })
            .flatten();
        if member.is_none() {
            self.desync("Member", user.id);
        }

        self.emit(CacheEvent::MemberRemove {
            guild_id,
            user,
            member,
        });
        Ok(())
    }

    /// Merge a chunk into the member map; members missing from it stay
    pub(super) fn members_chunk(&mut self, chunk: &GuildMembersChunkPayload) -> SyncResult<()> {
        let guild_id = chunk.guild_id;
        let keep_presences = self.cache.config().presences;

        let members: Vec<_> = chunk.members.iter().map(|m| m.to_member(guild_id)).collect();
        let presences: Vec<_> = chunk.presences.iter().map(|p| p.to_presence(guild_id)).collect();
        for payload in &chunk.members {
            self.cache.upsert_user(payload.user.to_user());
        }
        for payload in &chunk.presences {
            if let Some(user) = payload.user.to_user() {
                self.cache.upsert_user(user);
            }
        }

        let user_ids: Vec<_> = members.iter().map(|m| m.user_id).collect();
        let stored = self.cache.update_guild(guild_id, |guild| {
            for member in members {
                guild.insert_member(member)?;
            }
            if keep_presences {
                for presence in presences {
                    guild.insert_presence(presence)?;
                }
            }
            Ok::<_, chat_core::DomainError>(())
        });
        match stored {
            Some(result) => result?,
            None => self.desync("Guild", guild_id),
        }

        tracing::debug!(
            shard_id = self.shard_id,
            guild_id = %guild_id,
            chunk = chunk.chunk_index,
            of = chunk.chunk_count,
            members = user_ids.len(),
            "Merged member chunk"
        );
        self.emit(CacheEvent::MembersChunk {
            guild_id,
            user_ids,
            not_found: chunk.not_found.clone(),
            chunk_index: chunk.chunk_index,
            chunk_count: chunk.chunk_count,
            nonce: chunk.nonce.clone(),
        });
        Ok(())
    }
}
