//! # chat-core
//!
//! Domain layer for the local mirror: identifiers, cached entities, and domain errors.
//! This crate has zero dependencies on infrastructure (network, runtime, storage).

pub mod entities;
pub mod error;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Activity, Attachment, CategoryChannel, Channel, ChannelType, DmChannel, Emoji,
    GroupDmChannel, Guild, GuildMember, Message, Presence, ReactionAggregate, ReactionEmoji,
    ReactionKey, Role, Status, StoreChannel, TextChannel, User, VoiceChannel,
};
pub use error::DomainError;
pub use value_objects::{Permissions, Snowflake, SnowflakeParseError};
