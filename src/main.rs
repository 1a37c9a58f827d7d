//! TTL Cache demo
//!
//! Walks through insert, sliding expiration, background eviction and shutdown
//! on a store configured from the environment.

use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::{evict_callback, Store, StoreConfig};

/// Main entry point for the TTL cache demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the store, which starts its sweeper
/// 4. Insert entries with and without eviction callbacks
/// 5. Keep one entry alive with sliding lookups while the other expires
/// 6. Print statistics and close the store
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StoreConfig::from_env();
    info!(
        "Configuration loaded: sweep_interval={:?}, sweep_policy={:?}",
        config.sweep_interval, config.sweep_policy
    );

    let store: Store<String> = Store::with_config(config)?;

    let on_evict = evict_callback(|key: &str, value: &String| {
        info!("Evicted {}={}", key, value);
    });
    store.insert("session", "alice".to_string(), Duration::from_millis(300), Some(on_evict.clone()));
    store.insert("token", "abc123".to_string(), Duration::from_millis(300), Some(on_evict));
    store.insert("scratch", "tmp".to_string(), Duration::from_secs(60), None);
    info!("Inserted {} entries", store.count());

    // Keep "session" alive while "token" runs out
    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(150)).await;
        let session = store.lookup("session", true);
        let token = store.lookup("token", false);
        info!("session={:?} token={:?} count={}", session, token, store.count());
    }

    store.delete("scratch");
    info!("Stats: {}", serde_json::to_string(&store.stats())?);

    store.close();
    info!("Store closed");
    Ok(())
}
