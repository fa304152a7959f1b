//! Cached domain entities
//!
//! Entities are plain values. Containers reference their dependents by id
//! (a guild lists its channel ids, a member names its user id) and never hold
//! a pointer back to the container that owns them.

mod channel;
mod emoji;
mod guild;
mod member;
mod message;
mod presence;
mod reaction;
mod role;
mod user;

pub use channel::{
    CategoryChannel, Channel, ChannelType, DmChannel, GroupDmChannel, StoreChannel, TextChannel,
    VoiceChannel,
};
pub use emoji::Emoji;
pub use guild::Guild;
pub use member::GuildMember;
pub use message::{Attachment, Message};
pub use presence::{Activity, Presence, Status};
pub use reaction::{ReactionAggregate, ReactionEmoji, ReactionKey};
pub use role::Role;
pub use user::User;
