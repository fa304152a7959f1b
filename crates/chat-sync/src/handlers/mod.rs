//! Per-entity event handlers
//!
//! Each submodule adds one `impl Apply` block covering the events of one
//! entity kind. A handler reads what it needs from the store, builds the new
//! value, swaps it in, and records the resulting notifications.

mod channels;
mod emojis;
mod guilds;
mod members;
mod messages;
mod presences;
mod reactions;
mod roles;
mod users;

use std::sync::atomic::{AtomicU64, Ordering};

use chat_cache::Cache;
use chat_common::ClientError;
use chat_core::Snowflake;
use chat_gateway::GatewayEvent;

use crate::error::SyncResult;
use crate::notification::CacheEvent;

/// Application of one dispatch event
pub(crate) struct Apply<'a> {
    cache: &'a Cache,
    shard_id: u32,
    shard_count: u32,
    desync: &'a AtomicU64,
    emitted: Vec<CacheEvent>,
}

impl<'a> Apply<'a> {
    pub(crate) fn new(cache: &'a Cache, shard_id: u32, shard_count: u32, desync: &'a AtomicU64) -> Self {
        Self {
            cache,
            shard_id,
            shard_count,
            desync,
            emitted: Vec::new(),
        }
    }

    pub(crate) fn into_events(self) -> Vec<CacheEvent> {
        self.emitted
    }

    fn emit(&mut self, event: CacheEvent) {
        self.emitted.push(event);
    }

    /// Record an update or delete for an entity the store does not hold
    fn desync(&self, kind: &'static str, id: Snowflake) {
        self.desync.fetch_add(1, Ordering::Relaxed);
        let error = ClientError::ProtocolDesync { kind, id };
        tracing::warn!(shard_id = self.shard_id, error = %error, "Applying event without cached state");
    }

    /// Route one event to its handler
    pub(crate) fn dispatch(&mut self, event: GatewayEvent) -> SyncResult<()> {
        match event {
            GatewayEvent::Ready(ready) => self.ready(&ready),
            GatewayEvent::Resumed => Ok(()),
            GatewayEvent::GuildCreate(guild) => self.guild_create(&guild),
            GatewayEvent::GuildUpdate(guild) => self.guild_update(&guild),
            GatewayEvent::GuildDelete(guild) => self.guild_delete(&guild),
            GatewayEvent::GuildBanAdd(ban) => self.guild_ban(&ban, true),
            GatewayEvent::GuildBanRemove(ban) => self.guild_ban(&ban, false),
            GatewayEvent::GuildEmojisUpdate(emojis) => self.guild_emojis_update(&emojis),
            GatewayEvent::GuildMemberAdd(member) => self.member_add(&member),
            GatewayEvent::GuildMemberUpdate(member) => self.member_update(&member),
            GatewayEvent::GuildMemberRemove(removal) => self.member_remove(&removal),
            GatewayEvent::GuildMembersChunk(chunk) => self.members_chunk(&chunk),
            GatewayEvent::GuildRoleCreate(role) => self.role_create(&role),
            GatewayEvent::GuildRoleUpdate(role) => self.role_update(&role),
            GatewayEvent::GuildRoleDelete(role) => self.role_delete(&role),
            GatewayEvent::ChannelCreate(channel) => self.channel_create(&channel),
            GatewayEvent::ChannelUpdate(channel) => self.channel_update(&channel),
            GatewayEvent::ChannelDelete(channel) => self.channel_delete(&channel),
            GatewayEvent::ChannelPinsUpdate(pins) => self.channel_pins_update(&pins),
            GatewayEvent::MessageCreate(message) => self.message_create(&message),
            GatewayEvent::MessageUpdate(update) => self.message_update(update),
            GatewayEvent::MessageDelete(deletion) => self.message_delete(&deletion),
            GatewayEvent::MessageDeleteBulk(deletion) => self.message_delete_bulk(&deletion),
            GatewayEvent::MessageReactionAdd(reaction) => self.reaction_add(&reaction),
            GatewayEvent::MessageReactionRemove(reaction) => self.reaction_remove(&reaction),
            GatewayEvent::MessageReactionRemoveAll(removal) => self.reaction_remove_all(&removal),
            GatewayEvent::PresenceUpdate(presence) => self.presence_update(&presence),
            GatewayEvent::TypingStart(typing) => self.typing_start(&typing),
            GatewayEvent::UserUpdate(user) => self.user_update(&user),
            GatewayEvent::Unknown { name, data } => {
                self.emit(CacheEvent::Raw {
                    shard_id: self.shard_id,
                    name,
                    data,
                });
                Ok(())
            }
        }
    }
}
