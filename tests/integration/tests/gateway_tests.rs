//! Gateway Session Integration Tests
//!
//! Drive the shard manager against a scripted in-memory gateway: handshake,
//! heartbeats, resume, identify fallback, fatal closes and shard routing.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::time::{Duration, Instant};

use chat_core::{Activity, Snowflake, Status};
use chat_gateway::protocol::{PresenceUpdatePayload, RequestGuildMembersPayload};
use chat_gateway::{shard_for, CloseCode, GatewayMessage, OpCode, SessionState};
use chat_sync::CacheEvent;
use integration_tests::fixtures::*;
use integration_tests::{test_config, Mirror, QUIET_HEARTBEAT_MS, TEST_TOKEN};
use serde_json::json;

// ============================================================================
// Handshake and heartbeat
// ============================================================================

#[tokio::test]
async fn test_identify_then_snapshot_reaches_cache() {
    let mut mirror = Mirror::start(&test_config(1));
    let guild_id = 1u64 << 22;

    let mut conn = mirror.gateway.accept().await;
    assert_eq!(conn.url, "wss://gateway.test");

    let identify = conn.establish("s1", &[guild_id], [0, 1]).await;
    let identify = identify.as_identify().expect("identify payload");
    assert_eq!(identify.token, TEST_TOKEN);
    assert_eq!(identify.shard, [0, 1]);

    conn.dispatch(2, "GUILD_CREATE", guild(guild_id, 10));
    let event = mirror
        .wait_for(|e| matches!(e, CacheEvent::GuildAvailable(_)))
        .await;
    assert!(matches!(event, CacheEvent::GuildAvailable(g) if g.id == Snowflake::new(guild_id)));

    assert!(mirror.cache().channel(Snowflake::new(10)).is_some());
    assert_eq!(mirror.cache().current_user_id(), Some(Snowflake::new(1)));
    assert_eq!(mirror.manager.shard_state(0), Some(SessionState::Connected { sequence: 2 }));

    mirror.shutdown().await;
}

#[tokio::test]
async fn test_ready_is_reported_as_shard_lifecycle() {
    let mut mirror = Mirror::start(&test_config(1));
    let mut conn = mirror.gateway.accept().await;
    conn.establish("s1", &[], [0, 1]).await;

    let event = mirror
        .wait_for(|e| matches!(e, CacheEvent::ShardReady { .. }))
        .await;
    assert!(matches!(event, CacheEvent::ShardReady { shard_id: 0, session_id } if session_id == "s1"));
    assert_eq!(mirror.manager.connected_count(), 1);

    mirror.shutdown().await;
}

#[tokio::test]
async fn test_requested_heartbeat_is_answered_with_last_sequence() {
    let mut mirror = Mirror::start(&test_config(1));
    let mut conn = mirror.gateway.accept().await;
    conn.establish("s1", &[], [0, 1]).await;
    conn.dispatch(2, "CHANNEL_CREATE", text_channel(10, 1 << 22, "general"));

    conn.send(&GatewayMessage::heartbeat(None));
    let heartbeat = conn.expect_op(OpCode::Heartbeat).await;
    assert_eq!(heartbeat.as_heartbeat_seq(), Some(Some(2)));

    mirror.shutdown().await;
}

#[tokio::test]
async fn test_acknowledged_heartbeats_keep_the_connection() {
    let mut mirror = Mirror::start(&test_config(1));
    let mut conn = mirror.gateway.accept().await;

    conn.hello(40);
    conn.expect_op(OpCode::Identify).await;
    conn.dispatch(1, "READY", ready("s1", &[], [0, 1]));

    for _ in 0..3 {
        let heartbeat = conn.expect_op(OpCode::Heartbeat).await;
        assert_eq!(heartbeat.as_heartbeat_seq(), Some(Some(1)));
        conn.ack();
    }

    assert!(!mirror.gateway.has_pending());
    assert!(mirror.manager.shard_state(0).is_some_and(|s| s.is_connected()));

    mirror.shutdown().await;
}

// ============================================================================
// Reconnect, resume and identify fallback
// ============================================================================

#[tokio::test]
async fn test_zombie_connection_resumes_then_falls_back_to_identify() {
    let mut mirror = Mirror::start(&test_config(1));
    let mut conn = mirror.gateway.accept().await;

    // Heartbeats are never acknowledged
    conn.hello(30);
    conn.expect_op(OpCode::Identify).await;
    conn.dispatch(1, "READY", ready("s1", &[], [0, 1]));
    assert_eq!(conn.expect_closed().await, Some(4000));

    mirror
        .wait_for(|e| matches!(e, CacheEvent::ShardReconnecting { resume: true, .. }))
        .await;

    // Three failed resumes against the resume URL
    for _ in 0..3 {
        let mut conn = mirror.gateway.accept().await;
        assert_eq!(conn.url, "wss://resume.test/s1");
        conn.hello(QUIET_HEARTBEAT_MS);

        let resume = conn.expect_op(OpCode::Resume).await;
        let resume = resume.as_resume().expect("resume payload");
        assert_eq!(resume.session_id, "s1");
        assert_eq!(resume.seq, 1);
        conn.hang_up();
    }

    // Then a fresh identify against the default URL
    let mut conn = mirror.gateway.accept().await;
    assert_eq!(conn.url, "wss://gateway.test");
    conn.hello(QUIET_HEARTBEAT_MS);
    let identify = conn.expect_op(OpCode::Identify).await;
    assert_eq!(identify.as_identify().map(|i| i.shard), Some([0, 1]));

    mirror.shutdown().await;
}

#[tokio::test]
async fn test_resume_after_drop_matches_uninterrupted_session() {
    let guild_id = 1u64 << 22;
    let activity = guild_activity(guild_id, 10);
    let split = 5;

    // Uninterrupted
    let mut steady = Mirror::start(&test_config(1));
    let mut conn = steady.gateway.accept().await;
    conn.establish("s1", &[guild_id], [0, 1]).await;
    for (i, (name, data)) in activity.iter().enumerate() {
        conn.dispatch(2 + i as u64, name, data.clone());
    }
    steady
        .wait_for(|e| matches!(e, CacheEvent::MessageDelete { .. }))
        .await;

    // Dropped after `split` events, then resumed with replay
    let mut resumed = Mirror::start(&test_config(1));
    let mut conn = resumed.gateway.accept().await;
    conn.establish("s1", &[guild_id], [0, 1]).await;
    for (i, (name, data)) in activity[..split].iter().enumerate() {
        conn.dispatch(2 + i as u64, name, data.clone());
    }
    conn.close(1001);

    let mut conn = resumed.gateway.accept().await;
    conn.hello(QUIET_HEARTBEAT_MS);
    let resume = conn.expect_op(OpCode::Resume).await;
    let last_seen = resume.as_resume().expect("resume payload").seq;
    assert_eq!(last_seen, 1 + split as u64);

    for (i, (name, data)) in activity.iter().enumerate().skip(split) {
        let seq = 2 + i as u64;
        assert!(seq > last_seen);
        conn.dispatch(seq, name, data.clone());
    }
    conn.dispatch(2 + activity.len() as u64, "RESUMED", json!({}));
    resumed
        .wait_for(|e| matches!(e, CacheEvent::ShardResumed { shard_id: 0 }))
        .await;

    assert_eq!(steady.cache().snapshot(), resumed.cache().snapshot());

    steady.shutdown().await;
    let synchronizer = resumed.shutdown().await;
    assert_eq!(synchronizer.desync_count(), 0);
}

#[tokio::test]
async fn test_server_reconnect_request_resumes() {
    let mut mirror = Mirror::start(&test_config(1));
    let mut conn = mirror.gateway.accept().await;
    conn.establish("s1", &[], [0, 1]).await;
    conn.dispatch(2, "CHANNEL_CREATE", text_channel(10, 1 << 22, "general"));

    conn.send(&GatewayMessage::reconnect());

    let mut conn = mirror.gateway.accept().await;
    assert_eq!(conn.url, "wss://resume.test/s1");
    conn.hello(QUIET_HEARTBEAT_MS);
    let resume = conn.expect_op(OpCode::Resume).await;
    let resume = resume.as_resume().expect("resume payload");
    assert_eq!(resume.token, TEST_TOKEN);
    assert_eq!(resume.session_id, "s1");
    assert_eq!(resume.seq, 2);

    mirror.shutdown().await;
}

#[tokio::test]
async fn test_non_resumable_invalid_session_identifies_again() {
    let mut mirror = Mirror::start(&test_config(1));
    let mut conn = mirror.gateway.accept().await;
    conn.establish("s1", &[], [0, 1]).await;

    conn.send(&GatewayMessage::invalid_session(false));

    let mut conn = mirror.gateway.accept().await;
    assert_eq!(conn.url, "wss://gateway.test");
    conn.hello(QUIET_HEARTBEAT_MS);
    conn.expect_op(OpCode::Identify).await;

    mirror.shutdown().await;
}

#[tokio::test]
async fn test_fatal_close_code_stops_the_shard() {
    let mut mirror = Mirror::start(&test_config(1));
    let mut conn = mirror.gateway.accept().await;
    conn.establish("s1", &[], [0, 1]).await;

    conn.close(4004);

    let event = mirror
        .wait_for(|e| matches!(e, CacheEvent::ShardFatal { .. }))
        .await;
    assert!(matches!(
        event,
        CacheEvent::ShardFatal {
            shard_id: 0,
            close_code: CloseCode::AuthenticationFailed
        }
    ));
    mirror
        .wait_for(|e| matches!(e, CacheEvent::ShardDisconnected { shard_id: 0 }))
        .await;

    assert_eq!(mirror.manager.shard_state(0), Some(SessionState::Disconnected));
    assert!(!mirror.gateway.has_pending());

    mirror.shutdown().await;
}

#[tokio::test]
async fn test_disconnect_during_backoff_stops_the_shard() {
    let mut config = test_config(1);
    config.backoff.base = Duration::from_millis(500);
    config.backoff.max = Duration::from_millis(1_000);
    let mut mirror = Mirror::start(&config);
    let mut conn = mirror.gateway.accept().await;
    conn.establish("s1", &[], [0, 1]).await;

    conn.close(1001);
    mirror
        .wait_for(|e| matches!(e, CacheEvent::ShardReconnecting { shard_id: 0, .. }))
        .await;
    assert!(matches!(mirror.manager.shard_state(0), Some(SessionState::Backoff { .. })));

    let stopped_at = Instant::now();
    mirror.manager.disconnect(0).expect("known shard");
    mirror
        .wait_for(|e| matches!(e, CacheEvent::ShardDisconnected { shard_id: 0 }))
        .await;
    assert!(stopped_at.elapsed() < Duration::from_millis(500));
    assert_eq!(mirror.manager.shard_state(0), Some(SessionState::Disconnected));

    // Well past the end of the abandoned backoff
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(!mirror.gateway.has_pending());
    assert_eq!(mirror.manager.shard_state(0), Some(SessionState::Disconnected));

    mirror.shutdown().await;
}

// ============================================================================
// Sharding
// ============================================================================

#[test]
fn test_routing_is_deterministic() {
    for shard_count in [1u32, 2, 3, 16] {
        for k in 0..50u64 {
            let guild_id = Snowflake::new((k * 7_919 + 13) << 22 | k);
            let first = shard_for(guild_id, shard_count);
            assert!(first < shard_count);
            for _ in 0..3 {
                assert_eq!(shard_for(guild_id, shard_count), first);
            }
        }
    }
    for shard_id in 0..4 {
        let guild_id = Snowflake::new(guild_id_on_shard(shard_id, 4, 9));
        assert_eq!(shard_for(guild_id, 4), shard_id);
    }
}

#[tokio::test]
async fn test_events_for_another_shard_are_discarded() {
    let mut mirror = Mirror::start(&test_config(2));
    let mine = guild_id_on_shard(0, 2, 1);
    let theirs = guild_id_on_shard(1, 2, 1);
    assert_eq!(mirror.manager.shard_for(Snowflake::new(mine)), 0);
    assert_eq!(mirror.manager.shard_for(Snowflake::new(theirs)), 1);

    // Find shard 0's connection
    let mut first = mirror.gateway.accept().await;
    let mut second = mirror.gateway.accept().await;
    first.hello(QUIET_HEARTBEAT_MS);
    second.hello(QUIET_HEARTBEAT_MS);
    let first_shard = first.expect_op(OpCode::Identify).await.as_identify().expect("identify").shard;
    let second_shard = second.expect_op(OpCode::Identify).await.as_identify().expect("identify").shard;
    let (conn, _other) = if first_shard[0] == 0 {
        (first, second)
    } else {
        (second, first)
    };
    assert_eq!(first_shard[0] + second_shard[0], 1);

    conn.dispatch(1, "READY", ready("s0", &[mine], [0, 2]));
    conn.dispatch(2, "GUILD_CREATE", guild(theirs, 20));
    conn.dispatch(3, "GUILD_CREATE", guild(mine, 10));

    mirror
        .wait_for(|e| matches!(e, CacheEvent::GuildAvailable(g) if g.id == Snowflake::new(mine)))
        .await;
    assert!(mirror.cache().guild(Snowflake::new(theirs)).is_none());
    assert!(mirror.cache().channel(Snowflake::new(20)).is_none());

    mirror.shutdown().await;
}

#[tokio::test]
async fn test_member_requests_go_to_the_owning_shard() {
    let mut mirror = Mirror::start(&test_config(2));
    let target = guild_id_on_shard(1, 2, 3);

    let mut first = mirror.gateway.accept().await;
    let mut second = mirror.gateway.accept().await;
    first.hello(QUIET_HEARTBEAT_MS);
    second.hello(QUIET_HEARTBEAT_MS);
    let first_shard = first.expect_op(OpCode::Identify).await.as_identify().expect("identify").shard;
    second.expect_op(OpCode::Identify).await;
    let mut owner = if first_shard[0] == 1 { first } else { second };

    mirror
        .manager
        .request_guild_members(RequestGuildMembersPayload::users(
            Snowflake::new(target),
            vec![Snowflake::new(100)],
        ))
        .await
        .expect("request queued");

    let request = owner.expect_op(OpCode::RequestGuildMembers).await;
    assert_eq!(
        request.d.as_ref().and_then(|d| d["guild_id"].as_str()),
        Some(target.to_string().as_str())
    );

    mirror.shutdown().await;
}

#[tokio::test]
async fn test_presence_update_is_sent_on_every_shard() {
    let mut mirror = Mirror::start(&test_config(2));
    let mut conns = [mirror.gateway.accept().await, mirror.gateway.accept().await];
    for conn in &mut conns {
        conn.hello(QUIET_HEARTBEAT_MS);
        conn.expect_op(OpCode::Identify).await;
    }

    mirror
        .manager
        .update_presence(PresenceUpdatePayload::new(Status::Idle).with_activity(Activity::playing("chess")))
        .await
        .expect("presence queued");

    for conn in &mut conns {
        let update = conn.expect_op(OpCode::PresenceUpdate).await;
        let data = update.d.expect("presence payload");
        assert_eq!(data["status"], "idle");
        assert_eq!(data["activities"][0]["name"], "chess");
    }

    mirror.shutdown().await;
}

#[tokio::test]
async fn test_identifies_are_spaced_across_shards() {
    let mut config = test_config(2);
    config.gateway.identify_interval = Duration::from_millis(150);
    let mut mirror = Mirror::start(&config);

    let first = mirror.gateway.accept().await;
    let opened = Instant::now();
    let second = mirror.gateway.accept().await;
    assert!(
        opened.elapsed() >= Duration::from_millis(100),
        "second identify after {:?}",
        opened.elapsed()
    );

    drop((first, second));
    mirror.shutdown().await;
}
