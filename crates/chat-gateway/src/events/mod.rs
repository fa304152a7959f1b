//! Gateway events
//!
//! Dispatch event names, their wire payloads, and the decoded event enum.

mod event_types;
mod gateway_event;
mod payloads;

pub use event_types::GatewayEventType;
pub use gateway_event::GatewayEvent;
pub use payloads::{
    AttachmentPayload, ChannelPayload, ChannelPinsUpdatePayload, EmojiPayload, GuildBanPayload,
    GuildEmojisPayload, GuildMemberRemovePayload, GuildMembersChunkPayload, GuildPayload,
    GuildRoleDeletePayload, GuildRolePayload, GuildSnapshot, MemberPayload,
    MessageDeleteBulkPayload, MessageDeletePayload, MessagePayload, MessageReferencePayload,
    MessageUpdatePayload, PartialUserPayload, PayloadError, PresencePayload,
    ReactionCountPayload, ReactionEmojiPayload, ReactionPayload, ReactionRemoveAllPayload,
    ReadyPayload, RolePayload, TypingStartPayload, UnavailableGuildPayload, UserPayload,
};
