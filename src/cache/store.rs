//! Cache Store Module
//!
//! Main cache engine combining a lock-guarded HashMap with per-entry TTL
//! expiration and a background sweeper.

use std::collections::HashMap;
use std::mem;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, error};

use crate::cache::stats::StatsCounters;
use crate::cache::{CacheEntry, CacheStats, EvictCallback};
use crate::config::StoreConfig;
use crate::error::Result;
use crate::tasks::{SweepTarget, Sweeper};

// == Store State ==
/// State shared by every handle of one store and weakly by its sweeper.
struct StoreState<V> {
    /// Key-value storage; the lock guards which keys exist
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    /// Hit/miss/eviction counters
    stats: StatsCounters,
}

impl<V> StoreState<V> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: StatsCounters::default(),
        }
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Fires callbacks outside the map lock so they may call back into the store.
    fn notify_evicted(removed: Vec<(String, CacheEntry<V>)>) {
        for (key, entry) in removed {
            entry.evict(&key);
        }
    }
}

impl<V: Send + Sync + 'static> SweepTarget for StoreState<V> {
    fn sweep_expired(&self) -> usize {
        let removed: Vec<(String, CacheEntry<V>)> = {
            let mut entries = self.entries.write();
            let expired_keys: Vec<String> = entries
                .iter()
                .filter(|(_, entry)| entry.is_expired())
                .map(|(key, _)| key.clone())
                .collect();

            expired_keys
                .into_iter()
                .filter_map(|key| entries.remove_entry(&key))
                .collect()
        };

        let count = removed.len();
        self.stats.record_expirations(count);
        Self::notify_evicted(removed);
        count
    }

    fn next_expiry(&self) -> Option<Instant> {
        self.entries
            .read()
            .values()
            .filter_map(CacheEntry::expires_at)
            .min()
    }

    fn min_ttl(&self) -> Option<Duration> {
        self.entries.read().values().map(CacheEntry::ttl).min()
    }
}

// == Cache Store ==
/// Thread-safe in-memory key-value store where every entry carries a TTL.
///
/// `Store` is a cheap handle: clones share the same entries, counters and
/// sweeper. Each independent `Store::new()` owns its own state.
///
/// Eviction callbacks run on the thread performing the eviction: the caller's
/// thread for [`delete`](Store::delete) and [`clear`](Store::clear), the
/// sweeper's thread for expiration. They run after the map lock is released.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use ttl_cache::Store;
///
/// let store: Store<u32> = Store::new();
/// store.insert("a", 1, Duration::from_secs(60), None);
/// assert_eq!(store.lookup("a", false), Some(1));
/// assert_eq!(store.hits(), 1);
/// store.close();
/// ```
pub struct Store<V> {
    state: Arc<StoreState<V>>,
    sweeper: Option<Arc<Sweeper>>,
}

impl<V> Clone for Store<V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            sweeper: self.sweeper.clone(),
        }
    }
}

impl<V> Store<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty store with the default configuration and starts its sweeper.
    ///
    /// If the sweeper cannot be started the failure is logged and the store
    /// works without background sweeping; lookups still hide expired entries
    /// and [`sweep`](Store::sweep) can be called manually.
    pub fn new() -> Self {
        match Self::with_config(StoreConfig::default()) {
            Ok(store) => store,
            Err(e) => {
                error!("Starting store without background sweeper: {}", e);
                Self {
                    state: Arc::new(StoreState::new()),
                    sweeper: None,
                }
            }
        }
    }

    /// Creates an empty store with a custom configuration and starts its sweeper.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;

        let state = Arc::new(StoreState::new());
        let sweeper = Sweeper::spawn(&state, &config)?;
        debug!(?config, "Store created");

        Ok(Self {
            state,
            sweeper: Some(Arc::new(sweeper)),
        })
    }

    // == Insert ==
    /// Stores a value under `key` with a full TTL window.
    ///
    /// An existing entry for `key` is replaced silently: its eviction
    /// callback does not fire, since overwrite is not delete.
    pub fn insert(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: Duration,
        on_evict: Option<EvictCallback<V>>,
    ) {
        let entry = CacheEntry::new(value, ttl, on_evict);
        entry.touch();

        let replaced = self.state.entries.write().insert(key.into(), entry);
        drop(replaced);

        if let Some(sweeper) = &self.sweeper {
            sweeper.reschedule_for(ttl);
        }
    }

    // == Lookup ==
    /// Retrieves a clone of the value stored under `key`.
    ///
    /// Returns `None` for missing keys and for expired entries, even those the
    /// sweeper has not yet removed. Lookup never evicts. On a hit the hit
    /// counter is incremented and, with `extend_on_access`, the entry's life
    /// is extended by a full TTL (sliding expiration).
    ///
    /// The map lock is taken shared: the touch is guarded by the entry's own
    /// lock and the hit counter is atomic, so only the key set needs protecting.
    pub fn lookup(&self, key: &str, extend_on_access: bool) -> Option<V> {
        let entries = self.state.entries.read();
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                if extend_on_access {
                    entry.touch();
                }
                self.state.stats.record_hit();
                Some(entry.value().clone())
            }
            _ => {
                self.state.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes `key`, firing its eviction callback.
    ///
    /// Returns false, and fires nothing, if the key was absent.
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.state.entries.write().remove_entry(key);
        match removed {
            Some((key, entry)) => {
                self.state.stats.record_evictions(1);
                entry.evict(&key);
                true
            }
            None => false,
        }
    }

    // == Clear ==
    /// Removes every entry in one locked pass, firing each eviction callback.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&self) -> usize {
        let drained = mem::take(&mut *self.state.entries.write());
        let removed: Vec<(String, CacheEntry<V>)> = drained.into_iter().collect();

        let count = removed.len();
        self.state.stats.record_evictions(count);
        StoreState::notify_evicted(removed);
        count
    }

    // == Sweep ==
    /// Runs one eviction pass now, removing every expired entry.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        self.state.sweep_expired()
    }

    // == Time To Live ==
    /// Returns the remaining lifetime of a live entry, `None` if missing or expired.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.state
            .entries
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired())
            .and_then(CacheEntry::ttl_remaining)
    }

    // == Count ==
    /// Returns the number of entries in the map, including expired ones not yet swept.
    pub fn count(&self) -> usize {
        self.state.len()
    }

    /// Returns true if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    // == Hits ==
    /// Returns the number of successful lookups so far.
    pub fn hits(&self) -> u64 {
        self.state.stats.hits()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.state.stats.snapshot(self.state.len())
    }

    // == Lifecycle ==
    /// Stops the background sweeper for every handle of this store.
    ///
    /// The store stays usable; expired entries are then only removed by
    /// [`sweep`](Store::sweep), [`delete`](Store::delete) or [`clear`](Store::clear).
    pub fn close(&self) {
        if let Some(sweeper) = &self.sweeper {
            sweeper.stop();
        }
    }

    /// Returns true while the background sweeper task is alive.
    pub fn is_sweeper_running(&self) -> bool {
        self.sweeper
            .as_ref()
            .map_or(false, |sweeper| sweeper.is_running())
    }
}

impl<V> Default for Store<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
