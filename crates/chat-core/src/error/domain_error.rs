//! Domain errors - lookups and ownership checks against cached entities

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Cached
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Guild not found: {0}")]
    GuildNotFound(Snowflake),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Role not found: {0}")]
    RoleNotFound(Snowflake),

    #[error("Emoji not found: {0}")]
    EmojiNotFound(Snowflake),

    #[error("Member {user_id} not found in guild {guild_id}")]
    MemberNotFound {
        guild_id: Snowflake,
        user_id: Snowflake,
    },

    // =========================================================================
    // Ownership
    // =========================================================================
    #[error("{kind} {id} belongs to guild {actual}, not {expected}")]
    GuildMismatch {
        kind: &'static str,
        id: Snowflake,
        expected: Snowflake,
        actual: Snowflake,
    },

    #[error("Guild is unavailable: {0}")]
    GuildUnavailable(Snowflake),

    // =========================================================================
    // Payload
    // =========================================================================
    #[error("Unknown channel type: {0}")]
    UnknownChannelType(u8),
}

impl DomainError {
    /// Get a stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::GuildNotFound(_) => "UNKNOWN_GUILD",
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::RoleNotFound(_) => "UNKNOWN_ROLE",
            Self::EmojiNotFound(_) => "UNKNOWN_EMOJI",
            Self::MemberNotFound { .. } => "UNKNOWN_MEMBER",
            Self::GuildMismatch { .. } => "GUILD_MISMATCH",
            Self::GuildUnavailable(_) => "GUILD_UNAVAILABLE",
            Self::UnknownChannelType(_) => "UNKNOWN_CHANNEL_TYPE",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::GuildNotFound(_)
                | Self::ChannelNotFound(_)
                | Self::MessageNotFound(_)
                | Self::RoleNotFound(_)
                | Self::EmojiNotFound(_)
                | Self::MemberNotFound { .. }
        )
    }

    /// The entity id the error refers to, when there is exactly one
    pub fn entity_id(&self) -> Option<Snowflake> {
        match self {
            Self::UserNotFound(id)
            | Self::GuildNotFound(id)
            | Self::ChannelNotFound(id)
            | Self::MessageNotFound(id)
            | Self::RoleNotFound(id)
            | Self::EmojiNotFound(id)
            | Self::GuildUnavailable(id) => Some(*id),
            Self::MemberNotFound { user_id, .. } => Some(*user_id),
            Self::GuildMismatch { id, .. } => Some(*id),
            Self::UnknownChannelType(_) => None,
        }
    }
}
