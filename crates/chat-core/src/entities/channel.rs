//! Channel entity - a tagged union over the channel kinds the platform serves
//!
//! Guild-scoped variants carry their guild id as a plain identifier; the guild
//! lists them by id in its channel index rather than owning them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Channel type discriminant as sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChannelType {
    /// Guild text channel
    GuildText = 0,
    /// Direct message between two users
    Dm = 1,
    /// Guild voice channel
    GuildVoice = 2,
    /// Direct message between several users
    GroupDm = 3,
    /// Guild category for organizing channels
    GuildCategory = 4,
    /// Guild announcement channel
    GuildAnnouncement = 5,
    /// Guild store channel
    GuildStore = 6,
}

impl ChannelType {
    /// Decode the wire discriminant
    pub fn from_u8(value: u8) -> Result<Self, DomainError> {
        match value {
            0 => Ok(Self::GuildText),
            1 => Ok(Self::Dm),
            2 => Ok(Self::GuildVoice),
            3 => Ok(Self::GroupDm),
            4 => Ok(Self::GuildCategory),
            5 => Ok(Self::GuildAnnouncement),
            6 => Ok(Self::GuildStore),
            other => Err(DomainError::UnknownChannelType(other)),
        }
    }

    /// Get the numeric value
    #[inline]
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether channels of this kind belong to a guild
    #[inline]
    #[must_use]
    pub fn is_guild(self) -> bool {
        !matches!(self, Self::Dm | Self::GroupDm)
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::GuildText => "text",
            Self::Dm => "dm",
            Self::GuildVoice => "voice",
            Self::GroupDm => "group_dm",
            Self::GuildCategory => "category",
            Self::GuildAnnouncement => "announcement",
            Self::GuildStore => "store",
        };
        f.write_str(name)
    }
}

/// Text or announcement channel inside a guild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChannel {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub position: i32,
    pub topic: Option<String>,
    pub nsfw: bool,
    pub parent_id: Option<Snowflake>,
    pub rate_limit_per_user: u32,
    pub last_message_id: Option<Snowflake>,
    pub last_pin_timestamp: Option<DateTime<Utc>>,
}

impl TextChannel {
    #[must_use]
    pub fn new(id: Snowflake, guild_id: Snowflake, name: String) -> Self {
        Self {
            id,
            guild_id,
            name,
            position: 0,
            topic: None,
            nsfw: false,
            parent_id: None,
            rate_limit_per_user: 0,
            last_message_id: None,
            last_pin_timestamp: None,
        }
    }
}

/// Voice channel inside a guild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceChannel {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub position: i32,
    pub parent_id: Option<Snowflake>,
    pub bitrate: u32,
    pub user_limit: u32,
}

/// Category grouping other guild channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChannel {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub position: i32,
}

/// Store channel inside a guild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChannel {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub position: i32,
    pub parent_id: Option<Snowflake>,
    pub nsfw: bool,
}

/// One-to-one direct message channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmChannel {
    pub id: Snowflake,
    pub recipient_id: Snowflake,
    pub last_message_id: Option<Snowflake>,
    pub last_pin_timestamp: Option<DateTime<Utc>>,
}

/// Group direct message channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDmChannel {
    pub id: Snowflake,
    pub name: Option<String>,
    pub icon: Option<String>,
    pub owner_id: Snowflake,
    pub recipient_ids: Vec<Snowflake>,
    pub last_message_id: Option<Snowflake>,
    pub last_pin_timestamp: Option<DateTime<Utc>>,
}

/// Channel entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    Text(TextChannel),
    Announcement(TextChannel),
    Voice(VoiceChannel),
    Category(CategoryChannel),
    Store(StoreChannel),
    Dm(DmChannel),
    GroupDm(GroupDmChannel),
}

impl Channel {
    #[must_use]
    pub fn id(&self) -> Snowflake {
        match self {
            Self::Text(c) | Self::Announcement(c) => c.id,
            Self::Voice(c) => c.id,
            Self::Category(c) => c.id,
            Self::Store(c) => c.id,
            Self::Dm(c) => c.id,
            Self::GroupDm(c) => c.id,
        }
    }

    /// Owning guild, `None` for direct message channels
    #[must_use]
    pub fn guild_id(&self) -> Option<Snowflake> {
        match self {
            Self::Text(c) | Self::Announcement(c) => Some(c.guild_id),
            Self::Voice(c) => Some(c.guild_id),
            Self::Category(c) => Some(c.guild_id),
            Self::Store(c) => Some(c.guild_id),
            Self::Dm(_) | Self::GroupDm(_) => None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ChannelType {
        match self {
            Self::Text(_) => ChannelType::GuildText,
            Self::Announcement(_) => ChannelType::GuildAnnouncement,
            Self::Voice(_) => ChannelType::GuildVoice,
            Self::Category(_) => ChannelType::GuildCategory,
            Self::Store(_) => ChannelType::GuildStore,
            Self::Dm(_) => ChannelType::Dm,
            Self::GroupDm(_) => ChannelType::GroupDm,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Text(c) | Self::Announcement(c) => Some(&c.name),
            Self::Voice(c) => Some(&c.name),
            Self::Category(c) => Some(&c.name),
            Self::Store(c) => Some(&c.name),
            Self::Dm(_) => None,
            Self::GroupDm(c) => c.name.as_deref(),
        }
    }

    /// Get display name (channel name or fallback for DMs)
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or("Direct Message")
    }

    /// Parent category for guild channels that can be nested
    #[must_use]
    pub fn parent_id(&self) -> Option<Snowflake> {
        match self {
            Self::Text(c) | Self::Announcement(c) => c.parent_id,
            Self::Voice(c) => c.parent_id,
            Self::Store(c) => c.parent_id,
            Self::Category(_) | Self::Dm(_) | Self::GroupDm(_) => None,
        }
    }

    /// Whether messages can be posted to (and cached for) this channel
    #[must_use]
    pub fn is_text_based(&self) -> bool {
        matches!(
            self,
            Self::Text(_) | Self::Announcement(_) | Self::Dm(_) | Self::GroupDm(_)
        )
    }

    #[inline]
    #[must_use]
    pub fn is_guild_channel(&self) -> bool {
        self.guild_id().is_some()
    }

    #[must_use]
    pub fn last_message_id(&self) -> Option<Snowflake> {
        match self {
            Self::Text(c) | Self::Announcement(c) => c.last_message_id,
            Self::Dm(c) => c.last_message_id,
            Self::GroupDm(c) => c.last_message_id,
            _ => None,
        }
    }

    /// Record the newest message id; ignored for channels without messages
    pub fn set_last_message_id(&mut self, message_id: Snowflake) {
        match self {
            Self::Text(c) | Self::Announcement(c) => c.last_message_id = Some(message_id),
            Self::Dm(c) => c.last_message_id = Some(message_id),
            Self::GroupDm(c) => c.last_message_id = Some(message_id),
            _ => {}
        }
    }

    #[must_use]
    pub fn last_pin_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Text(c) | Self::Announcement(c) => c.last_pin_timestamp,
            Self::Dm(c) => c.last_pin_timestamp,
            Self::GroupDm(c) => c.last_pin_timestamp,
            _ => None,
        }
    }

    /// Record the latest pin time; ignored for channels without messages
    pub fn set_last_pin_timestamp(&mut self, timestamp: Option<DateTime<Utc>>) {
        match self {
            Self::Text(c) | Self::Announcement(c) => c.last_pin_timestamp = timestamp,
            Self::Dm(c) => c.last_pin_timestamp = timestamp,
            Self::GroupDm(c) => c.last_pin_timestamp = timestamp,
            _ => {}
        }
    }
}
