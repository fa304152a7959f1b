//! Mirror entry point
//!
//! Connects every configured shard, keeps an in-memory mirror of the account's
//! view, and logs each change until interrupted.
//!
//! Run with:
//! ```bash
//! CHAT_TOKEN=... cargo run -p chat-sync --bin chat-mirror
//! ```

use std::sync::Arc;

use chat_cache::Cache;
use chat_common::{try_init_tracing_with_config, ClientConfig, Environment, TracingConfig};
use chat_gateway::{ShardManager, WebSocketConnector};
use chat_sync::CacheSynchronizer;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(Environment::from_env())) {
        eprintln!("Warning: Failed to initialize tracing: {}", e);
    }

    if let Err(e) = run().await {
        error!(error = %e, "Mirror stopped with an error");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting chat mirror...");

    let config = ClientConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;
    config.validate()?;

    info!(
        env = ?config.env,
        shards = config.gateway.shard_count,
        url = %config.gateway.url,
        "Configuration loaded"
    );

    let cache = Arc::new(Cache::new(config.cache));
    let synchronizer = Arc::new(CacheSynchronizer::new(Arc::clone(&cache), config.gateway.event_buffer));
    let mut notifications = synchronizer.subscribe();

    let (manager, events) = ShardManager::start(&config, WebSocketConnector);

    let sync_task = {
        let synchronizer = Arc::clone(&synchronizer);
        tokio::spawn(async move { synchronizer.run(events).await })
    };

    let log_task = tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(event) if event.is_shard_lifecycle() => info!(?event, "Shard lifecycle"),
                Ok(event) => debug!(event = event.name(), "Cache updated"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Notification log lagging"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received, shutting down shards");

    manager.shutdown().await;
    if let Err(e) = sync_task.await {
        warn!(error = %e, "Synchronizer task ended abnormally");
    }
    drop(synchronizer);
    let _ = log_task.await;

    info!(
        stats = %cache.stats(),
        "Chat mirror stopped"
    );
    Ok(())
}
