//! Test fixtures and data generators
//!
//! Wire payloads in the shape the gateway sends them, plus the scripted event
//! sequences shared by the synchronizer and session tests.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Value};

/// Counter for unique session ids
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Guild id that routes to `shard_id` out of `shard_count`
///
/// `k` picks among the many ids that route there.
pub fn guild_id_on_shard(shard_id: u32, shard_count: u32, k: u64) -> u64 {
    (k * u64::from(shard_count) + u64::from(shard_id)) << 22
}

pub fn user(id: u64) -> Value {
    json!({ "id": id.to_string(), "username": format!("user{id}"), "discriminator": "0001" })
}

pub fn role(id: u64, name: &str) -> Value {
    json!({ "id": id.to_string(), "name": name, "permissions": "1024" })
}

pub fn member(guild_id: Option<u64>, user_id: u64, nick: Option<&str>, roles: &[u64]) -> Value {
    let mut member = json!({
        "user": user(user_id),
        "nick": nick,
        "roles": roles.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "joined_at": "2024-01-01T00:00:00Z",
    });
    if let Some(guild_id) = guild_id {
        member["guild_id"] = json!(guild_id.to_string());
    }
    member
}

pub fn emoji(id: u64, name: &str) -> Value {
    json!({ "id": id.to_string(), "name": name })
}

pub fn text_channel(id: u64, guild_id: u64, name: &str) -> Value {
    json!({ "id": id.to_string(), "type": 0, "guild_id": guild_id.to_string(), "name": name })
}

/// Full guild snapshot: roles `@everyone` and 5, members 100 and 101,
/// emoji 70, and one text channel `channel_id`
pub fn guild(id: u64, channel_id: u64) -> Value {
    json!({
        "id": id.to_string(),
        "name": format!("guild{id}"),
        "owner_id": "100",
        "roles": [role(id, "@everyone"), role(5, "moderator")],
        "emojis": [emoji(70, "wave")],
        "members": [member(None, 100, None, &[]), member(None, 101, Some("bee"), &[5])],
        "channels": [{ "id": channel_id.to_string(), "type": 0, "name": "general" }],
        "presences": [{ "user": { "id": "101" }, "status": "online" }],
    })
}

/// READY for the current user 1, listing `guilds` as unavailable
pub fn ready(session_id: &str, guilds: &[u64], shard: [u32; 2]) -> Value {
    json!({
        "v": 10,
        "user": user(1),
        "session_id": session_id,
        "resume_gateway_url": format!("wss://resume.test/{session_id}"),
        "shard": shard,
        "guilds": guilds
            .iter()
            .map(|id| json!({ "id": id.to_string(), "unavailable": true }))
            .collect::<Vec<_>>(),
    })
}

pub fn message(id: u64, channel_id: u64, guild_id: u64, author_id: u64, content: &str) -> Value {
    json!({
        "id": id.to_string(),
        "channel_id": channel_id.to_string(),
        "guild_id": guild_id.to_string(),
        "author": user(author_id),
        "content": content,
        "timestamp": "2024-01-01T00:00:00Z",
    })
}

pub fn reaction(user_id: u64, channel_id: u64, message_id: u64, guild_id: u64, emoji: &str) -> Value {
    json!({
        "user_id": user_id.to_string(),
        "channel_id": channel_id.to_string(),
        "message_id": message_id.to_string(),
        "guild_id": guild_id.to_string(),
        "emoji": { "name": emoji },
    })
}

/// A day in the life of guild `guild_id`: one (name, payload) per dispatch
///
/// Covers a member edit, a role, an emoji swap, messages and reactions.
pub fn guild_activity(guild_id: u64, channel_id: u64) -> Vec<(&'static str, Value)> {
    vec![
        ("GUILD_CREATE", guild(guild_id, channel_id)),
        ("GUILD_MEMBER_UPDATE", member(Some(guild_id), 100, Some("ant"), &[5])),
        (
            "GUILD_ROLE_CREATE",
            json!({ "guild_id": guild_id.to_string(), "role": role(6, "helper") }),
        ),
        (
            "GUILD_EMOJIS_UPDATE",
            json!({ "guild_id": guild_id.to_string(), "emojis": [emoji(70, "wave"), emoji(71, "heart")] }),
        ),
        ("MESSAGE_CREATE", message(500, channel_id, guild_id, 100, "hello")),
        ("MESSAGE_CREATE", message(501, channel_id, guild_id, 101, "hi")),
        ("MESSAGE_REACTION_ADD", reaction(101, channel_id, 500, guild_id, "👍")),
        ("MESSAGE_REACTION_ADD", reaction(1, channel_id, 500, guild_id, "👍")),
        (
            "MESSAGE_UPDATE",
            json!({ "id": "501", "channel_id": channel_id.to_string(), "guild_id": guild_id.to_string(), "content": "hi all", "edited_timestamp": "2024-01-01T00:05:00Z" }),
        ),
        ("MESSAGE_REACTION_REMOVE", reaction(101, channel_id, 500, guild_id, "👍")),
        (
            "GUILD_MEMBER_REMOVE",
            json!({ "guild_id": guild_id.to_string(), "user": user(101) }),
        ),
        (
            "MESSAGE_DELETE",
            json!({ "id": "501", "channel_id": channel_id.to_string(), "guild_id": guild_id.to_string() }),
        ),
    ]
}
