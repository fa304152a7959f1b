//! Synchronizer Integration Tests
//!
//! Feed recorded dispatch sequences through `CacheSynchronizer` and check the
//! resulting store and notifications.
//!
//! Run with: cargo test -p integration-tests --test sync_tests

use std::sync::Arc;

use chat_cache::Cache;
use chat_core::{ChannelType, ReactionKey, Snowflake};
use chat_gateway::{GatewayEvent, ShardEvent};
use chat_sync::{CacheEvent, CacheSynchronizer};
use integration_tests::fixtures::*;
use serde_json::{json, Value};

fn synchronizer() -> CacheSynchronizer {
    CacheSynchronizer::new(Arc::new(Cache::default()), 1024)
}

/// Shard 0 of a single-shard session
const SOLO: [u32; 2] = [0, 1];

fn event([shard_id, shard_count]: [u32; 2], sequence: u64, name: &str, data: Value) -> ShardEvent {
    ShardEvent::Dispatch {
        shard_id,
        shard_count,
        sequence: Some(sequence),
        event: GatewayEvent::from_dispatch(name, data).expect("valid dispatch"),
    }
}

/// Apply `(name, payload)` pairs in order, numbering them from `first_seq`
fn feed(sync: &CacheSynchronizer, shard: [u32; 2], first_seq: u64, events: &[(&str, Value)]) -> Vec<CacheEvent> {
    events
        .iter()
        .enumerate()
        .flat_map(|(i, (name, data))| sync.apply(event(shard, first_seq + i as u64, name, data.clone())))
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_channel_create_is_stored_and_notified_once() {
    let sync = synchronizer();
    let events = feed(&sync, SOLO, 1, &[("CHANNEL_CREATE", text_channel(10, 1, "general"))]);

    let created: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, CacheEvent::ChannelCreate(c) if c.id() == Snowflake::new(10)))
        .collect();
    assert_eq!(created.len(), 1);

    let channel = sync.cache().channel(Snowflake::new(10)).expect("channel 10 cached");
    assert_eq!(channel.kind(), ChannelType::GuildText);
}

#[test]
fn test_nickname_update_leaves_roles_untouched() {
    let sync = synchronizer();
    feed(&sync, SOLO, 1, &[("GUILD_CREATE", guild(1 << 22, 10))]);
    let guild_id = 1u64 << 22;

    let events = feed(
        &sync,
        SOLO,
        2,
        &[("GUILD_MEMBER_UPDATE", member(Some(guild_id), 101, Some("wasp"), &[5]))],
    );

    let [CacheEvent::MemberUpdate { old: Some(old), new }] = &events[..] else {
        panic!("expected one member update, got {events:?}");
    };
    assert_eq!(old.role_ids, new.role_ids);
    assert_eq!(old.nickname.as_deref(), Some("bee"));
    assert_eq!(new.nickname.as_deref(), Some("wasp"));

    let cached = sync
        .cache()
        .member(Snowflake::new(guild_id), Snowflake::new(101))
        .expect("member cached");
    assert_eq!(cached.role_ids, old.role_ids);
}

#[test]
fn test_emoji_swap_is_one_removal_and_one_addition() {
    let sync = synchronizer();
    let guild_id = 1u64 << 22;
    let mut snapshot = guild(guild_id, 10);
    snapshot["emojis"] = json!([emoji(70, "a"), emoji(71, "b")]);
    feed(&sync, SOLO, 1, &[("GUILD_CREATE", snapshot)]);

    let events = feed(
        &sync,
        SOLO,
        2,
        &[(
            "GUILD_EMOJIS_UPDATE",
            json!({ "guild_id": guild_id.to_string(), "emojis": [emoji(70, "a"), emoji(72, "c")] }),
        )],
    );

    assert_eq!(events.len(), 2, "{events:?}");
    assert!(matches!(&events[0], CacheEvent::EmojiDelete(e) if e.id == Snowflake::new(71)));
    assert!(matches!(&events[1], CacheEvent::EmojiCreate(e) if e.id == Snowflake::new(72)));

    let guild = sync.cache().guild(Snowflake::new(guild_id)).expect("guild cached");
    let mut ids: Vec<_> = guild.emojis.keys().copied().collect();
    ids.sort();
    assert_eq!(ids, vec![Snowflake::new(70), Snowflake::new(72)]);
}

#[test]
fn test_reaction_count_never_negative_under_any_interleaving() {
    let guild_id = 1u64 << 22;
    // Every order of two adds and three removes for the same key
    let orders = [
        "aarrr", "ararr", "arrar", "arrra", "raarr", "rarar", "rarra", "rraar", "rrara", "rrraa",
    ];

    for order in orders {
        let sync = synchronizer();
        feed(
            &sync,
            SOLO,
            1,
            &[
                ("CHANNEL_CREATE", text_channel(10, guild_id, "general")),
                ("MESSAGE_CREATE", message(500, 10, guild_id, 7, "hi")),
            ],
        );

        for (i, step) in order.chars().enumerate() {
            let name = if step == 'a' {
                "MESSAGE_REACTION_ADD"
            } else {
                "MESSAGE_REACTION_REMOVE"
            };
            feed(&sync, SOLO, 3 + i as u64, &[(name, reaction(7, 10, 500, guild_id, "🔥"))]);

            let message = sync
                .cache()
                .message(Snowflake::new(10), Snowflake::new(500))
                .expect("message cached");
            if let Some(aggregate) = message.reaction(&ReactionKey::Unicode("🔥".to_string())) {
                assert!(aggregate.count > 0, "order {order}: empty aggregate kept");
            }
        }
    }
}

#[test]
fn test_desync_never_stops_processing() {
    let sync = synchronizer();
    let guild_id = 1u64 << 22;

    feed(
        &sync,
        SOLO,
        1,
        &[
            ("GUILD_MEMBER_UPDATE", member(Some(guild_id), 5, Some("ghost"), &[])),
            ("MESSAGE_DELETE", json!({ "id": "1", "channel_id": "2" })),
            ("CHANNEL_DELETE", text_channel(3, guild_id, "gone")),
            ("CHANNEL_CREATE", text_channel(10, guild_id, "general")),
        ],
    );

    assert_eq!(sync.desync_count(), 3);
    assert!(sync.cache().channel(Snowflake::new(10)).is_some());
}

// ============================================================================
// Replay
// ============================================================================

#[test]
fn test_replay_into_fresh_store_is_identical() {
    let guild_id = 1u64 << 22;
    let mut recorded = vec![("READY", ready("abc", &[guild_id], [0, 1]))];
    recorded.extend(guild_activity(guild_id, 10));

    let live = synchronizer();
    feed(&live, SOLO, 1, &recorded);

    let replayed = synchronizer();
    feed(&replayed, SOLO, 1, &recorded);

    assert_eq!(live.cache().snapshot(), replayed.cache().snapshot());
    assert_eq!(live.desync_count(), 0);
}

#[test]
fn test_shard_interleaving_does_not_change_outcome() {
    let a = guild_id_on_shard(0, 2, 1);
    let b = guild_id_on_shard(1, 2, 1);
    let ready_a = [("READY", ready("s0", &[a], [0, 2]))];
    let ready_b = [("READY", ready("s1", &[b], [1, 2]))];
    let activity_a = guild_activity(a, 10);
    let activity_b = guild_activity(b, 20);

    // Shard by shard
    let sequential = synchronizer();
    feed(&sequential, [0, 2], 1, &ready_a);
    feed(&sequential, [1, 2], 1, &ready_b);
    feed(&sequential, [0, 2], 2, &activity_a);
    feed(&sequential, [1, 2], 2, &activity_b);

    // Alternating, each shard keeping its own order
    let interleaved = synchronizer();
    feed(&interleaved, [1, 2], 1, &ready_b);
    feed(&interleaved, [0, 2], 1, &ready_a);
    for i in 0..activity_a.len().max(activity_b.len()) {
        if let Some(step) = activity_b.get(i) {
            feed(&interleaved, [1, 2], 2 + i as u64, std::slice::from_ref(step));
        }
        if let Some(step) = activity_a.get(i) {
            feed(&interleaved, [0, 2], 2 + i as u64, std::slice::from_ref(step));
        }
    }

    assert_eq!(sequential.cache().snapshot(), interleaved.cache().snapshot());
    assert_eq!(sequential.cache().stats().guilds, 2);
}

#[test]
fn test_ready_drops_guilds_the_shard_no_longer_has() {
    let sync = synchronizer();
    let kept = 1u64 << 22;
    let left = 2u64 << 22;

    feed(&sync, SOLO, 1, &[("READY", ready("first", &[kept, left], [0, 1]))]);
    feed(&sync, SOLO, 2, &[("GUILD_CREATE", guild(kept, 10)), ("GUILD_CREATE", guild(left, 20))]);
    assert_eq!(sync.cache().stats().guilds, 2);

    // A fresh session that no longer lists `left`
    let events = feed(&sync, SOLO, 1, &[("READY", ready("second", &[kept], [0, 1]))]);
    assert!(sync.cache().guild(Snowflake::new(left)).is_none());
    assert!(sync.cache().channel(Snowflake::new(20)).is_none());
    assert!(events.iter().any(|e| matches!(e, CacheEvent::Ready { .. })));

    // `kept` comes back through the outage path
    let events = feed(&sync, SOLO, 2, &[("GUILD_CREATE", guild(kept, 10))]);
    assert!(matches!(&events[..], [CacheEvent::GuildAvailable(g)] if g.id == Snowflake::new(kept)));
}

#[test]
fn test_ready_without_shard_field_keeps_other_shards_guilds() {
    let sync = synchronizer();
    let ours = guild_id_on_shard(1, 2, 1);
    let theirs = guild_id_on_shard(0, 2, 1);

    feed(&sync, [0, 2], 1, &[("GUILD_CREATE", guild(theirs, 10))]);
    feed(&sync, [1, 2], 1, &[("GUILD_CREATE", guild(ours, 20))]);

    let mut payload = ready("s1", &[ours], [1, 2]);
    payload.as_object_mut().expect("object").remove("shard");
    let events = feed(&sync, [1, 2], 2, &[("READY", payload)]);

    assert!(sync.cache().guild(Snowflake::new(theirs)).is_some());
    assert!(sync.cache().guild(Snowflake::new(ours)).is_some());
    assert!(!events.iter().any(|e| matches!(e, CacheEvent::GuildRemove { .. })));
}
