//! Typed dispatch events
//!
//! A dispatch frame's `t`/`d` pair decoded into one variant per event name.

use super::payloads::{
    ChannelPayload, ChannelPinsUpdatePayload, GuildBanPayload, GuildEmojisPayload,
    GuildMemberRemovePayload, GuildMembersChunkPayload, GuildPayload, GuildRoleDeletePayload,
    GuildRolePayload, MemberPayload, MessageDeleteBulkPayload, MessageDeletePayload,
    MessagePayload, MessageUpdatePayload, PayloadError, PresencePayload, ReactionPayload,
    ReactionRemoveAllPayload, ReadyPayload, TypingStartPayload, UnavailableGuildPayload,
    UserPayload,
};
use super::GatewayEventType;
use chat_core::Snowflake;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A decoded dispatch event
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Ready(Box<ReadyPayload>),
    Resumed,
    GuildCreate(Box<GuildPayload>),
    GuildUpdate(Box<GuildPayload>),
    GuildDelete(UnavailableGuildPayload),
    GuildBanAdd(GuildBanPayload),
    GuildBanRemove(GuildBanPayload),
    GuildEmojisUpdate(GuildEmojisPayload),
    GuildMemberAdd(Box<MemberPayload>),
    GuildMemberUpdate(Box<MemberPayload>),
    GuildMemberRemove(GuildMemberRemovePayload),
    GuildMembersChunk(Box<GuildMembersChunkPayload>),
    GuildRoleCreate(GuildRolePayload),
    GuildRoleUpdate(GuildRolePayload),
    GuildRoleDelete(GuildRoleDeletePayload),
    ChannelCreate(Box<ChannelPayload>),
    ChannelUpdate(Box<ChannelPayload>),
    ChannelDelete(Box<ChannelPayload>),
    ChannelPinsUpdate(ChannelPinsUpdatePayload),
    MessageCreate(Box<MessagePayload>),
    MessageUpdate(Box<MessageUpdatePayload>),
    MessageDelete(MessageDeletePayload),
    MessageDeleteBulk(MessageDeleteBulkPayload),
    MessageReactionAdd(Box<ReactionPayload>),
    MessageReactionRemove(Box<ReactionPayload>),
    MessageReactionRemoveAll(ReactionRemoveAllPayload),
    PresenceUpdate(Box<PresencePayload>),
    TypingStart(Box<TypingStartPayload>),
    UserUpdate(UserPayload),
    /// An event name this client does not model
    Unknown { name: String, data: Value },
}

fn parse<T: DeserializeOwned>(data: Value) -> Result<T, PayloadError> {
    Ok(serde_json::from_value(data)?)
}

impl GatewayEvent {
    /// Decode a dispatch payload by event name
    pub fn from_dispatch(name: &str, data: Value) -> Result<Self, PayloadError> {
        use GatewayEventType as T;

        let Some(kind) = GatewayEventType::from_name(name) else {
            return Ok(Self::Unknown {
                name: name.to_string(),
                data,
            });
        };

        let event = match kind {
            T::Ready => Self::Ready(parse(data)?),
            T::Resumed => Self::Resumed,
            T::GuildCreate => Self::GuildCreate(parse(data)?),
            T::GuildUpdate => Self::GuildUpdate(parse(data)?),
            T::GuildDelete => Self::GuildDelete(parse(data)?),
            T::GuildBanAdd => Self::GuildBanAdd(parse(data)?),
            T::GuildBanRemove => Self::GuildBanRemove(parse(data)?),
            T::GuildEmojisUpdate => Self::GuildEmojisUpdate(parse(data)?),
            T::GuildMemberAdd => Self::GuildMemberAdd(parse(data)?),
            T::GuildMemberUpdate => Self::GuildMemberUpdate(parse(data)?),
            T::GuildMemberRemove => Self::GuildMemberRemove(parse(data)?),
            T::GuildMembersChunk => Self::GuildMembersChunk(parse(data)?),
            T::GuildRoleCreate => Self::GuildRoleCreate(parse(data)?),
            T::GuildRoleUpdate => Self::GuildRoleUpdate(parse(data)?),
            T::GuildRoleDelete => Self::GuildRoleDelete(parse(data)?),
            T::ChannelCreate => Self::ChannelCreate(parse(data)?),
            T::ChannelUpdate => Self::ChannelUpdate(parse(data)?),
            T::ChannelDelete => Self::ChannelDelete(parse(data)?),
            T::ChannelPinsUpdate => Self::ChannelPinsUpdate(parse(data)?),
            T::MessageCreate => Self::MessageCreate(parse(data)?),
            T::MessageUpdate => Self::MessageUpdate(parse(data)?),
            T::MessageDelete => Self::MessageDelete(parse(data)?),
            T::MessageDeleteBulk => Self::MessageDeleteBulk(parse(data)?),
            T::MessageReactionAdd => Self::MessageReactionAdd(parse(data)?),
            T::MessageReactionRemove => Self::MessageReactionRemove(parse(data)?),
            T::MessageReactionRemoveAll => Self::MessageReactionRemoveAll(parse(data)?),
            T::PresenceUpdate => Self::PresenceUpdate(parse(data)?),
            T::TypingStart => Self::TypingStart(parse(data)?),
            T::UserUpdate => Self::UserUpdate(parse(data)?),
        };
        Ok(event)
    }

    /// Event type, `None` for unknown events
    #[must_use]
    pub fn kind(&self) -> Option<GatewayEventType> {
        use GatewayEventType as T;

        Some(match self {
            Self::Ready(_) => T::Ready,
            Self::Resumed => T::Resumed,
            Self::GuildCreate(_) => T::GuildCreate,
            Self::GuildUpdate(_) => T::GuildUpdate,
            Self::GuildDelete(_) => T::GuildDelete,
            Self::GuildBanAdd(_) => T::GuildBanAdd,
            Self::GuildBanRemove(_) => T::GuildBanRemove,
            Self::GuildEmojisUpdate(_) => T::GuildEmojisUpdate,
            Self::GuildMemberAdd(_) => T::GuildMemberAdd,
            Self::GuildMemberUpdate(_) => T::GuildMemberUpdate,
            Self::GuildMemberRemove(_) => T::GuildMemberRemove,
            Self::GuildMembersChunk(_) => T::GuildMembersChunk,
            Self::GuildRoleCreate(_) => T::GuildRoleCreate,
            Self::GuildRoleUpdate(_) => T::GuildRoleUpdate,
            Self::GuildRoleDelete(_) => T::GuildRoleDelete,
            Self::ChannelCreate(_) => T::ChannelCreate,
            Self::ChannelUpdate(_) => T::ChannelUpdate,
            Self::ChannelDelete(_) => T::ChannelDelete,
            Self::ChannelPinsUpdate(_) => T::ChannelPinsUpdate,
            Self::MessageCreate(_) => T::MessageCreate,
            Self::MessageUpdate(_) => T::MessageUpdate,
            Self::MessageDelete(_) => T::MessageDelete,
            Self::MessageDeleteBulk(_) => T::MessageDeleteBulk,
            Self::MessageReactionAdd(_) => T::MessageReactionAdd,
            Self::MessageReactionRemove(_) => T::MessageReactionRemove,
            Self::MessageReactionRemoveAll(_) => T::MessageReactionRemoveAll,
            Self::PresenceUpdate(_) => T::PresenceUpdate,
            Self::TypingStart(_) => T::TypingStart,
            Self::UserUpdate(_) => T::UserUpdate,
            Self::Unknown { .. } => return None,
        })
    }

    /// Wire name of the event
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Unknown { name, .. } => name,
            other => other.kind().map_or("", GatewayEventType::as_str),
        }
    }

    /// Guild the event is scoped to, if any
    ///
    /// Used to route events and to reject events that belong to another shard.
    #[must_use]
    pub fn guild_id(&self) -> Option<Snowflake> {
        match self {
            Self::GuildCreate(g) | Self::GuildUpdate(g) => Some(g.id),
            Self::GuildDelete(g) => Some(g.id),
            Self::GuildBanAdd(b) | Self::GuildBanRemove(b) => Some(b.guild_id),
            Self::GuildEmojisUpdate(e) => Some(e.guild_id),
            Self::GuildMemberAdd(m) | Self::GuildMemberUpdate(m) => m.guild_id,
            Self::GuildMemberRemove(m) => Some(m.guild_id),
            Self::GuildMembersChunk(c) => Some(c.guild_id),
            Self::GuildRoleCreate(r) | Self::GuildRoleUpdate(r) => Some(r.guild_id),
            Self::GuildRoleDelete(r) => Some(r.guild_id),
            Self::ChannelCreate(c) | Self::ChannelUpdate(c) | Self::ChannelDelete(c) => c.guild_id,
            Self::ChannelPinsUpdate(p) => p.guild_id,
            Self::MessageCreate(m) => m.guild_id,
            Self::MessageUpdate(m) => m.guild_id,
            Self::MessageDelete(m) => m.guild_id,
            Self::MessageDeleteBulk(m) => m.guild_id,
            Self::MessageReactionAdd(r) | Self::MessageReactionRemove(r) => r.guild_id,
            Self::MessageReactionRemoveAll(r) => r.guild_id,
            Self::PresenceUpdate(p) => p.guild_id,
            Self::TypingStart(t) => t.guild_id,
            Self::Ready(_) | Self::Resumed | Self::UserUpdate(_) | Self::Unknown { .. } => None,
        }
    }
}
