//! Cache synchronizer
//!
//! Single consumer of the shard manager's fan-in stream. Each event is applied
//! to the store before the next one is read, and its notifications are
//! published on a broadcast channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chat_cache::Cache;
use chat_gateway::ShardEvent;
use tokio::sync::{broadcast, mpsc};

use crate::handlers::Apply;
use crate::notification::CacheEvent;

/// Applies shard events to a [`Cache`] and notifies subscribers
pub struct CacheSynchronizer {
    cache: Arc<Cache>,
    notifications: broadcast::Sender<CacheEvent>,
    applied: AtomicU64,
    desync: AtomicU64,
    failed: AtomicU64,
}

impl CacheSynchronizer {
    /// Create a synchronizer over `cache`
    ///
    /// `buffer` bounds how far a slow subscriber may lag before it starts
    /// missing notifications.
    #[must_use]
    pub fn new(cache: Arc<Cache>, buffer: usize) -> Self {
        let (notifications, _) = broadcast::channel(buffer.max(1));
        Self {
            cache,
            notifications,
            applied: AtomicU64::new(0),
            desync: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<Cache> {
        &self.cache
    }

    /// Receive every notification published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.notifications.subscribe()
    }

    /// Dispatch events applied so far
    #[must_use]
    pub fn applied_count(&self) -> u64 {
        self.applied.load(Ordering::Relaxed)
    }

    /// Updates and deletes that referenced something the store did not hold
    #[must_use]
    pub fn desync_count(&self) -> u64 {
        self.desync.load(Ordering::Relaxed)
    }

    /// Dispatch events skipped because their payload could not be applied
    #[must_use]
    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Apply one event and publish its notifications
    ///
    /// Returns the published notifications. A malformed event is logged and
    /// skipped; it never stops later events from being applied.
    pub fn apply(&self, event: ShardEvent) -> Vec<CacheEvent> {
        let events = match event {
            ShardEvent::Dispatch {
                shard_id,
                shard_count,
                sequence,
                event,
            } => {
                let name = event.name().to_string();
                let mut apply = Apply::new(&self.cache, shard_id, shard_count, &self.desync);
                match apply.dispatch(event) {
                    Ok(()) => {
                        self.applied.fetch_add(1, Ordering::Relaxed);
                        tracing::trace!(shard_id, seq = ?sequence, event = %name, "Applied dispatch");
                    }
                    Err(e) => {
                        self.failed.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(shard_id, seq = ?sequence, event = %name, error = %e, "Skipping dispatch");
                    }
                }
                apply.into_events()
            }
            ShardEvent::Ready {
                shard_id,
                session_id,
            } => vec![CacheEvent::ShardReady {
                shard_id,
                session_id,
            }],
            ShardEvent::Resumed { shard_id } => vec![CacheEvent::ShardResumed { shard_id }],
            ShardEvent::Reconnecting {
                shard_id,
                attempt,
                delay,
                resume,
            } => vec![CacheEvent::ShardReconnecting {
                shard_id,
                attempt,
                delay,
                resume,
            }],
            ShardEvent::Disconnected { shard_id } => vec![CacheEvent::ShardDisconnected { shard_id }],
            ShardEvent::Fatal {
                shard_id,
                close_code,
            } => vec![CacheEvent::ShardFatal {
                shard_id,
                close_code,
            }],
        };

        for event in &events {
            // No subscribers is fine; the store is still updated
            let _ = self.notifications.send(event.clone());
        }
        events
    }

    /// Apply events until the stream ends
    pub async fn run(&self, mut events: mpsc::Receiver<ShardEvent>) {
        tracing::info!("Cache synchronizer started");

        while let Some(event) = events.recv().await {
            self.apply(event);
        }

        tracing::info!(
            applied = self.applied_count(),
            desync = self.desync_count(),
            failed = self.failed_count(),
            stats = %self.cache.stats(),
            "Cache synchronizer stopped"
        );
    }
}

impl std::fmt::Debug for CacheSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheSynchronizer")
            .field("applied", &self.applied_count())
            .field("desync", &self.desync_count())
            .field("subscribers", &self.notifications.receiver_count())
            .finish_non_exhaustive()
    }
}
