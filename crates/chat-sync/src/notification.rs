//! Consumer-facing notifications
//!
//! Update notifications carry `old: None` when the previous value was not
//! cached. Delete notifications always carry the wire identifiers; the full
//! value is `None` when it was never known locally, and consumers cannot learn
//! more than the identifiers in that case.

use std::time::Duration;

use chat_core::{
    Channel, Emoji, Guild, GuildMember, Message, Presence, ReactionAggregate, ReactionEmoji, Role,
    Snowflake, User,
};
use chat_gateway::events::MessageUpdatePayload;
use chat_gateway::CloseCode;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// What one applied event changed
#[derive(Debug, Clone)]
pub enum CacheEvent {
    // =========================================================================
    // Shard lifecycle
    // =========================================================================
    ShardReady {
        shard_id: u32,
        session_id: String,
    },
    ShardResumed {
        shard_id: u32,
    },
    ShardReconnecting {
        shard_id: u32,
        attempt: u32,
        delay: Duration,
        resume: bool,
    },
    ShardDisconnected {
        shard_id: u32,
    },
    ShardFatal {
        shard_id: u32,
        close_code: CloseCode,
    },

    /// READY was applied: the current user is known and the listed guilds
    /// will follow as snapshots
    Ready {
        shard_id: u32,
        user: User,
        unavailable_guilds: Vec<Snowflake>,
    },

    // =========================================================================
    // Guilds
    // =========================================================================
    /// A guild became visible for the first time
    GuildJoined(Guild),
    /// A guild came back from an outage
    GuildAvailable(Guild),
    GuildUpdate {
        old: Option<Guild>,
        new: Guild,
    },
    GuildUnavailable {
        guild_id: Snowflake,
    },
    GuildRemove {
        guild_id: Snowflake,
        guild: Option<Guild>,
    },
    BanAdd {
        guild_id: Snowflake,
        user: User,
    },
    BanRemove {
        guild_id: Snowflake,
        user: User,
    },
    EmojiCreate(Emoji),
    EmojiUpdate {
        old: Emoji,
        new: Emoji,
    },
    EmojiDelete(Emoji),

    // =========================================================================
    // Members and roles
    // =========================================================================
    MemberAdd(GuildMember),
    MemberUpdate {
        old: Option<GuildMember>,
        new: GuildMember,
    },
    MemberRemove {
        guild_id: Snowflake,
        user: User,
        member: Option<GuildMember>,
    },
    MembersChunk {
        guild_id: Snowflake,
        user_ids: Vec<Snowflake>,
        not_found: Vec<Snowflake>,
        chunk_index: u32,
        chunk_count: u32,
        nonce: Option<String>,
    },
    RoleCreate(Role),
    RoleUpdate {
        old: Option<Role>,
        new: Role,
    },
    RoleDelete {
        guild_id: Snowflake,
        role_id: Snowflake,
        role: Option<Role>,
    },

    // =========================================================================
    // Channels
    // =========================================================================
    ChannelCreate(Channel),
    ChannelUpdate {
        old: Option<Channel>,
        new: Channel,
    },
    ChannelDelete {
        channel_id: Snowflake,
        guild_id: Option<Snowflake>,
        channel: Option<Channel>,
    },
    ChannelPinsUpdate {
        channel_id: Snowflake,
        guild_id: Option<Snowflake>,
        last_pin_timestamp: Option<DateTime<Utc>>,
    },

    // =========================================================================
    // Messages and reactions
    // =========================================================================
    MessageCreate(Message),
    MessageUpdate {
        old: Option<Message>,
        new: Message,
    },
    /// An edit to an uncached message whose payload was too partial to build one
    RawMessageUpdate(Box<MessageUpdatePayload>),
    MessageDelete {
        message_id: Snowflake,
        channel_id: Snowflake,
        guild_id: Option<Snowflake>,
        message: Option<Message>,
    },
    MessageDeleteBulk {
        message_ids: Vec<Snowflake>,
        channel_id: Snowflake,
        guild_id: Option<Snowflake>,
        /// The subset of deleted messages that were cached
        messages: Vec<Message>,
    },
    /// `message` is the cached message after the change, `None` when uncached
    ReactionAdd {
        channel_id: Snowflake,
        message_id: Snowflake,
        guild_id: Option<Snowflake>,
        user_id: Snowflake,
        emoji: ReactionEmoji,
        message: Option<Message>,
    },
    ReactionRemove {
        channel_id: Snowflake,
        message_id: Snowflake,
        guild_id: Option<Snowflake>,
        user_id: Snowflake,
        emoji: ReactionEmoji,
        message: Option<Message>,
    },
    ReactionRemoveAll {
        channel_id: Snowflake,
        message_id: Snowflake,
        guild_id: Option<Snowflake>,
        removed: Vec<ReactionAggregate>,
        message: Option<Message>,
    },

    // =========================================================================
    // Users and presence
    // =========================================================================
    PresenceUpdate {
        old: Option<Presence>,
        new: Presence,
    },
    TypingStart {
        channel_id: Snowflake,
        guild_id: Option<Snowflake>,
        user_id: Snowflake,
        timestamp: DateTime<Utc>,
    },
    UserUpdate {
        old: Option<User>,
        new: User,
    },

    /// A dispatch this client does not model, passed through untouched
    Raw {
        shard_id: u32,
        name: String,
        data: Value,
    },
}

impl CacheEvent {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ShardReady { .. } => "shard_ready",
            Self::ShardResumed { .. } => "shard_resumed",
            Self::ShardReconnecting { .. } => "shard_reconnecting",
            Self::ShardDisconnected { .. } => "shard_disconnected",
            Self::ShardFatal { .. } => "shard_fatal",
            Self::Ready { .. } => "ready",
            Self::GuildJoined(_) => "guild_joined",
            Self::GuildAvailable(_) => "guild_available",
            Self::GuildUpdate { .. } => "guild_update",
            Self::GuildUnavailable { .. } => "guild_unavailable",
            Self::GuildRemove { .. } => "guild_remove",
            Self::BanAdd { .. } => "ban_add",
            Self::BanRemove { .. } => "ban_remove",
            Self::EmojiCreate(_) => "emoji_create",
            Self::EmojiUpdate { .. } => "emoji_update",
            Self::EmojiDelete(_) => "emoji_delete",
            Self::MemberAdd(_) => "member_add",
            Self::MemberUpdate { .. } => "member_update",
            Self::MemberRemove { .. } => "member_remove",
            Self::MembersChunk { .. } => "members_chunk",
            Self::RoleCreate(_) => "role_create",
            Self::RoleUpdate { .. } => "role_update",
            Self::RoleDelete { .. } => "role_delete",
            Self::ChannelCreate(_) => "channel_create",
            Self::ChannelUpdate { .. } => "channel_update",
            Self::ChannelDelete { .. } => "channel_delete",
            Self::ChannelPinsUpdate { .. } => "channel_pins_update",
            Self::MessageCreate(_) => "message_create",
            Self::MessageUpdate { .. } => "message_update",
            Self::RawMessageUpdate(_) => "raw_message_update",
            Self::MessageDelete { .. } => "message_delete",
            Self::MessageDeleteBulk { .. } => "message_delete_bulk",
            Self::ReactionAdd { .. } => "reaction_add",
            Self::ReactionRemove { .. } => "reaction_remove",
            Self::ReactionRemoveAll { .. } => "reaction_remove_all",
            Self::PresenceUpdate { .. } => "presence_update",
            Self::TypingStart { .. } => "typing_start",
            Self::UserUpdate { .. } => "user_update",
            Self::Raw { name, .. } => name,
        }
    }

    /// Whether this reports a shard lifecycle change rather than entity data
    #[must_use]
    pub fn is_shard_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::ShardReady { .. }
                | Self::ShardResumed { .. }
                | Self::ShardReconnecting { .. }
                | Self::ShardDisconnected { .. }
                | Self::ShardFatal { .. }
        )
    }
}
