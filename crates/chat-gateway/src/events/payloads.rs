//! Event payload definitions
//!
//! Wire shapes for each dispatch event, plus the constructors that turn them
//! into cached entities. Channel variants are decided here, from the `type`
//! discriminant, and nowhere else.

use chat_core::{
    Activity, Attachment, CategoryChannel, Channel, ChannelType, DmChannel, DomainError, Emoji,
    GroupDmChannel, Guild, GuildMember, Message, Permissions, Presence, ReactionAggregate,
    ReactionEmoji, Role, Snowflake, Status, StoreChannel, TextChannel, User, VoiceChannel,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Failure to turn a payload into entities
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

// === Connection Events ===

/// READY event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyPayload {
    /// Gateway protocol version
    #[serde(default)]
    pub v: u8,

    /// Current user
    pub user: UserPayload,

    /// Guilds the user is in, all initially unavailable
    #[serde(default)]
    pub guilds: Vec<UnavailableGuildPayload>,

    /// Session ID for resuming
    pub session_id: String,

    /// Gateway URL to use when resuming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_gateway_url: Option<String>,

    /// `[shard_id, shard_count]` this session was identified as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<[u32; 2]>,
}

/// Guild stub in READY and GUILD_DELETE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailableGuildPayload {
    pub id: Snowflake,
    /// `true` for an outage; absent when the client was removed
    #[serde(default)]
    pub unavailable: bool,
}

impl UnavailableGuildPayload {
    #[must_use]
    pub fn new(id: Snowflake) -> Self {
        Self {
            id,
            unavailable: true,
        }
    }
}

// === User Payloads ===

/// Full user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub id: Snowflake,
    pub username: String,
    #[serde(default = "default_discriminator")]
    pub discriminator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub system: bool,
}

fn default_discriminator() -> String {
    "0".to_string()
}

impl UserPayload {
    #[must_use]
    pub fn to_user(&self) -> User {
        let mut user = User::new(self.id, self.username.clone(), self.discriminator.clone());
        user.global_name.clone_from(&self.global_name);
        user.avatar.clone_from(&self.avatar);
        user.bot = self.bot;
        user.system = self.system;
        user
    }
}

/// User reference that may or may not carry the full record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialUserPayload {
    pub id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<bool>,
}

impl PartialUserPayload {
    /// The full user, when the payload carries one
    #[must_use]
    pub fn to_user(&self) -> Option<User> {
        let username = self.username.clone()?;
        let mut user = User::new(
            self.id,
            username,
            self.discriminator.clone().unwrap_or_else(default_discriminator),
        );
        user.global_name.clone_from(&self.global_name);
        user.avatar.clone_from(&self.avatar);
        user.bot = self.bot.unwrap_or(false);
        Some(user)
    }
}

// === Guild Payloads ===

/// Full guild snapshot (GUILD_CREATE) or guild settings (GUILD_UPDATE)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildPayload {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub owner_id: Snowflake,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u64>,
    #[serde(default)]
    pub large: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub roles: Vec<RolePayload>,
    #[serde(default)]
    pub emojis: Vec<EmojiPayload>,
    #[serde(default)]
    pub members: Vec<MemberPayload>,
    #[serde(default)]
    pub channels: Vec<ChannelPayload>,
    #[serde(default)]
    pub presences: Vec<PresencePayload>,
}

/// A guild with every nested collection populated, plus the records it references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSnapshot {
    pub guild: Guild,
    pub channels: Vec<Channel>,
    /// Users referenced by members and presences
    pub users: Vec<User>,
}

impl GuildPayload {
    /// Build the guild and its channels
    ///
    /// Members, roles, emojis and presences are placed inside the guild;
    /// channels come back separately since they live in the global channel map.
    pub fn to_snapshot(&self) -> Result<GuildSnapshot, PayloadError> {
        let mut guild = Guild::new(self.id, self.name.clone(), self.owner_id);
        guild.icon.clone_from(&self.icon);
        guild.large = self.large;
        guild.joined_at = self.joined_at;
        guild.member_count = self.member_count.unwrap_or(self.members.len() as u64);

        for role in &self.roles {
            guild.insert_role(role.to_role(self.id))?;
        }
        for emoji in &self.emojis {
            guild.insert_emoji(emoji.to_emoji(self.id))?;
        }

        let mut users = Vec::with_capacity(self.members.len());
        for member in &self.members {
            guild.insert_member(member.to_member(self.id))?;
            users.push(member.user.to_user());
        }
        for presence in &self.presences {
            guild.insert_presence(presence.to_presence(self.id))?;
            users.extend(presence.user.to_user());
        }

        let mut channels = Vec::with_capacity(self.channels.len());
        for payload in &self.channels {
            let channel = payload.to_channel(Some(self.id))?;
            guild.channel_ids.insert(channel.id());
            channels.push(channel);
        }

        Ok(GuildSnapshot {
            guild,
            channels,
            users,
        })
    }
}

/// GUILD_BAN_ADD / GUILD_BAN_REMOVE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildBanPayload {
    pub guild_id: Snowflake,
    pub user: UserPayload,
}

/// GUILD_EMOJIS_UPDATE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildEmojisPayload {
    pub guild_id: Snowflake,
    pub emojis: Vec<EmojiPayload>,
}

impl GuildEmojisPayload {
    #[must_use]
    pub fn to_emojis(&self) -> Vec<Emoji> {
        self.emojis.iter().map(|e| e.to_emoji(self.guild_id)).collect()
    }
}

// === Role Payloads ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePayload {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub mentionable: bool,
}

impl RolePayload {
    #[must_use]
    pub fn to_role(&self, guild_id: Snowflake) -> Role {
        let mut role = Role::new(self.id, guild_id, self.name.clone(), self.permissions);
        role.color = self.color;
        role.hoist = self.hoist;
        role.position = self.position;
        role.managed = self.managed;
        role.mentionable = self.mentionable;
        role
    }
}

/// GUILD_ROLE_CREATE / GUILD_ROLE_UPDATE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildRolePayload {
    pub guild_id: Snowflake,
    pub role: RolePayload,
}

/// GUILD_ROLE_DELETE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildRoleDeletePayload {
    pub guild_id: Snowflake,
    pub role_id: Snowflake,
}

// === Emoji Payloads ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmojiPayload {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserPayload>,
    #[serde(default = "default_true")]
    pub require_colons: bool,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub animated: bool,
    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_true() -> bool {
    true
}

impl EmojiPayload {
    #[must_use]
    pub fn to_emoji(&self, guild_id: Snowflake) -> Emoji {
        let mut emoji = Emoji::new(self.id, guild_id, self.name.clone());
        emoji.role_ids.clone_from(&self.roles);
        emoji.creator_id = self.user.as_ref().map(|u| u.id);
        emoji.require_colons = self.require_colons;
        emoji.managed = self.managed;
        emoji.animated = self.animated;
        emoji.available = self.available;
        emoji
    }
}

// === Member Payloads ===

/// Guild member; `guild_id` is present on member events, absent inside snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    pub user: UserPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub pending: bool,
}

impl MemberPayload {
    #[must_use]
    pub fn to_member(&self, guild_id: Snowflake) -> GuildMember {
        let mut member = GuildMember::new(guild_id, self.user.id);
        member.nickname.clone_from(&self.nick);
        member.role_ids.clone_from(&self.roles);
        member.joined_at = self.joined_at;
        member.premium_since = self.premium_since;
        member.deaf = self.deaf;
        member.mute = self.mute;
        member.pending = self.pending;
        member
    }

    /// Guild id carried by a member event
    pub fn require_guild_id(&self) -> Result<Snowflake, PayloadError> {
        self.guild_id.ok_or(PayloadError::MissingField("guild_id"))
    }
}

/// GUILD_MEMBER_REMOVE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildMemberRemovePayload {
    pub guild_id: Snowflake,
    pub user: UserPayload,
}

/// GUILD_MEMBERS_CHUNK
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildMembersChunkPayload {
    pub guild_id: Snowflake,
    pub members: Vec<MemberPayload>,
    #[serde(default)]
    pub chunk_index: u32,
    #[serde(default = "default_chunk_count")]
    pub chunk_count: u32,
    #[serde(default)]
    pub not_found: Vec<Snowflake>,
    #[serde(default)]
    pub presences: Vec<PresencePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

fn default_chunk_count() -> u32 {
    1
}

impl GuildMembersChunkPayload {
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.chunk_index + 1 >= self.chunk_count
    }
}

// === Presence Payloads ===

/// PRESENCE_UPDATE, and the presence entries of snapshots and chunks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresencePayload {
    pub user: PartialUserPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl PresencePayload {
    /// Build the presence, preferring the payload's own guild id
    #[must_use]
    pub fn to_presence(&self, guild_id: Snowflake) -> Presence {
        let mut presence = Presence::new(self.user.id, self.guild_id.unwrap_or(guild_id), self.status);
        presence.activities.clone_from(&self.activities);
        presence
    }
}

// === Channel Payloads ===

/// Any channel kind, discriminated by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelPayload {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Snowflake>,
    #[serde(default)]
    pub rate_limit_per_user: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_pin_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_limit: Option<u32>,
    #[serde(default)]
    pub recipients: Vec<UserPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Snowflake>,
}

impl ChannelPayload {
    const DEFAULT_BITRATE: u32 = 64_000;

    /// Build the channel variant named by `type`
    ///
    /// `guild_id` fills in for snapshot channels, which omit their own.
    pub fn to_channel(&self, guild_id: Option<Snowflake>) -> Result<Channel, PayloadError> {
        let kind = ChannelType::from_u8(self.kind)?;
        let guild_id = self.guild_id.or(guild_id);
        let require_guild = || guild_id.ok_or(PayloadError::MissingField("guild_id"));
        let name = self.name.clone().unwrap_or_default();

        let channel = match kind {
            ChannelType::GuildText | ChannelType::GuildAnnouncement => {
                let text = TextChannel {
                    id: self.id,
                    guild_id: require_guild()?,
                    name,
                    position: self.position,
                    topic: self.topic.clone(),
                    nsfw: self.nsfw,
                    parent_id: self.parent_id,
                    rate_limit_per_user: self.rate_limit_per_user,
                    last_message_id: self.last_message_id,
                    last_pin_timestamp: self.last_pin_timestamp,
                };
                if kind == ChannelType::GuildText {
                    Channel::Text(text)
                } else {
                    Channel::Announcement(text)
                }
            }
            ChannelType::GuildVoice => Channel::Voice(VoiceChannel {
                id: self.id,
                guild_id: require_guild()?,
                name,
                position: self.position,
                parent_id: self.parent_id,
                bitrate: self.bitrate.unwrap_or(Self::DEFAULT_BITRATE),
                user_limit: self.user_limit.unwrap_or(0),
            }),
            ChannelType::GuildCategory => Channel::Category(CategoryChannel {
                id: self.id,
                guild_id: require_guild()?,
                name,
                position: self.position,
            }),
            ChannelType::GuildStore => Channel::Store(StoreChannel {
                id: self.id,
                guild_id: require_guild()?,
                name,
                position: self.position,
                parent_id: self.parent_id,
                nsfw: self.nsfw,
            }),
            ChannelType::Dm => Channel::Dm(DmChannel {
                id: self.id,
                recipient_id: self
                    .recipients
                    .first()
                    .map(|u| u.id)
                    .ok_or(PayloadError::MissingField("recipients"))?,
                last_message_id: self.last_message_id,
                last_pin_timestamp: self.last_pin_timestamp,
            }),
            ChannelType::GroupDm => Channel::GroupDm(GroupDmChannel {
                id: self.id,
                name: self.name.clone(),
                icon: self.icon.clone(),
                owner_id: self.owner_id.ok_or(PayloadError::MissingField("owner_id"))?,
                recipient_ids: self.recipients.iter().map(|u| u.id).collect(),
                last_message_id: self.last_message_id,
                last_pin_timestamp: self.last_pin_timestamp,
            }),
        };
        Ok(channel)
    }

    /// Recipients of a direct message channel
    #[must_use]
    pub fn recipient_users(&self) -> Vec<User> {
        self.recipients.iter().map(UserPayload::to_user).collect()
    }
}

/// CHANNEL_PINS_UPDATE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelPinsUpdatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_pin_timestamp: Option<DateTime<Utc>>,
}

// === Message Payloads ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentPayload {
    pub id: Snowflake,
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl From<&AttachmentPayload> for Attachment {
    fn from(payload: &AttachmentPayload) -> Self {
        Self {
            id: payload.id,
            filename: payload.filename.clone(),
            size: payload.size,
            url: payload.url.clone(),
            content_type: payload.content_type.clone(),
        }
    }
}

/// Emoji reference on reaction payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionEmojiPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub animated: bool,
}

impl ReactionEmojiPayload {
    #[must_use]
    pub fn to_emoji(&self) -> ReactionEmoji {
        ReactionEmoji {
            id: self.id,
            name: self.name.clone(),
            animated: self.animated,
        }
    }
}

/// Reaction tally embedded in a full message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionCountPayload {
    pub count: u32,
    #[serde(default)]
    pub me: bool,
    pub emoji: ReactionEmojiPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReferencePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
}

/// MESSAGE_CREATE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePayload {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    pub author: UserPayload,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tts: bool,
    #[serde(default)]
    pub mention_everyone: bool,
    #[serde(default)]
    pub mentions: Vec<UserPayload>,
    #[serde(default)]
    pub mention_roles: Vec<Snowflake>,
    #[serde(default)]
    pub attachments: Vec<AttachmentPayload>,
    #[serde(default)]
    pub reactions: Vec<ReactionCountPayload>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageReferencePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<Snowflake>,
}

impl MessagePayload {
    #[must_use]
    pub fn to_message(&self) -> Message {
        let mut message = Message::new(
            self.id,
            self.channel_id,
            self.author.id,
            self.content.clone(),
            self.timestamp,
        );
        message.guild_id = self.guild_id;
        message.edited_timestamp = self.edited_timestamp;
        message.tts = self.tts;
        message.mention_everyone = self.mention_everyone;
        message.mentions = self.mentions.iter().map(|u| u.id).collect();
        message.mention_roles.clone_from(&self.mention_roles);
        message.attachments = self.attachments.iter().map(Attachment::from).collect();
        message.pinned = self.pinned;
        message.kind = self.kind;
        message.reference_id = self.message_reference.as_ref().and_then(|r| r.message_id);
        message.webhook_id = self.webhook_id;
        for reaction in &self.reactions {
            let emoji = reaction.emoji.to_emoji();
            message.reactions.insert(
                emoji.key(),
                ReactionAggregate {
                    emoji,
                    count: reaction.count,
                    me: reaction.me,
                },
            );
        }
        message
    }

    /// Author and mentioned users
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        std::iter::once(&self.author)
            .chain(&self.mentions)
            .map(UserPayload::to_user)
            .collect()
    }
}

/// MESSAGE_UPDATE: only `id` and `channel_id` are guaranteed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageUpdatePayload {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<UserPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention_everyone: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<UserPayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention_roles: Option<Vec<Snowflake>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<AttachmentPayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
}

impl MessageUpdatePayload {
    /// New value built from the cached one, with every field the payload carries replaced
    #[must_use]
    pub fn apply_to(&self, old: &Message) -> Message {
        let mut message = old.clone();
        if let Some(author) = &self.author {
            message.author_id = author.id;
        }
        if let Some(content) = &self.content {
            message.content.clone_from(content);
        }
        if let Some(timestamp) = self.timestamp {
            message.timestamp = timestamp;
        }
        if self.edited_timestamp.is_some() {
            message.edited_timestamp = self.edited_timestamp;
        }
        if let Some(tts) = self.tts {
            message.tts = tts;
        }
        if let Some(everyone) = self.mention_everyone {
            message.mention_everyone = everyone;
        }
        if let Some(mentions) = &self.mentions {
            message.mentions = mentions.iter().map(|u| u.id).collect();
        }
        if let Some(roles) = &self.mention_roles {
            message.mention_roles.clone_from(roles);
        }
        if let Some(attachments) = &self.attachments {
            message.attachments = attachments.iter().map(Attachment::from).collect();
        }
        if let Some(pinned) = self.pinned {
            message.pinned = pinned;
        }
        message
    }

    /// A whole message, when the payload carries enough to build one without a cached copy
    #[must_use]
    pub fn to_message(&self) -> Option<Message> {
        let author = self.author.as_ref()?;
        let timestamp = self.timestamp?;
        let mut base = Message::new(
            self.id,
            self.channel_id,
            author.id,
            String::new(),
            timestamp,
        );
        base.guild_id = self.guild_id;
        Some(self.apply_to(&base))
    }

    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.author
            .iter()
            .chain(self.mentions.iter().flatten())
            .map(UserPayload::to_user)
            .collect()
    }
}

/// MESSAGE_DELETE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDeletePayload {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
}

/// MESSAGE_DELETE_BULK
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDeleteBulkPayload {
    pub ids: Vec<Snowflake>,
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
}

// === Reaction Payloads ===

/// MESSAGE_REACTION_ADD / MESSAGE_REACTION_REMOVE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionPayload {
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    pub emoji: ReactionEmojiPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberPayload>,
}

/// MESSAGE_REACTION_REMOVE_ALL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRemoveAllPayload {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
}

// === Typing ===

/// TYPING_START
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingStartPayload {
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    pub user_id: Snowflake,
    /// Unix timestamp in seconds
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberPayload>,
}
