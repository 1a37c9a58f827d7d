//! Cache Entry Module
//!
//! Defines a single cache record with its own lock over its expiration state.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::error;

/// Upper bound applied to TTLs when computing expiration instants (~100 years).
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Notification invoked with `(key, value)` when an entry is evicted.
pub type EvictCallback<V> = Arc<dyn Fn(&str, &V) + Send + Sync>;

/// Wraps a closure as an [`EvictCallback`].
pub fn evict_callback<V, F>(f: F) -> EvictCallback<V>
where
    F: Fn(&str, &V) + Send + Sync + 'static,
{
    Arc::new(f)
}

// == Cache Entry ==
/// Represents a single cache entry with value, TTL and eviction hook.
pub struct CacheEntry<V> {
    /// The stored value
    value: V,
    /// Lifetime granted by each touch
    ttl: Duration,
    /// Absolute expiration instant, None = never touched (treated as expired)
    expires_at: RwLock<Option<Instant>>,
    /// Fired once when the entry leaves the store through delete, clear or sweep
    on_evict: Option<EvictCallback<V>>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an untouched entry. It reports expired until [`touch`](Self::touch)
    /// is called.
    pub fn new(value: V, ttl: Duration, on_evict: Option<EvictCallback<V>>) -> Self {
        Self {
            value,
            ttl,
            expires_at: RwLock::new(None),
            on_evict,
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Touch ==
    /// Resets the expiration instant to `now + ttl`.
    ///
    /// TTLs above [`MAX_TTL`] are clamped. The instant never moves backwards.
    pub fn touch(&self) {
        let now = Instant::now();
        let next = now.checked_add(self.ttl.min(MAX_TTL)).unwrap_or(now);
        let mut expires_at = self.expires_at.write();
        match *expires_at {
            Some(current) if current > next => {}
            _ => *expires_at = Some(next),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry that was never touched is expired. Otherwise it expires once
    /// its expiration instant is strictly before now.
    pub fn is_expired(&self) -> bool {
        match *self.expires_at.read() {
            Some(expires) => expires < Instant::now(),
            None => true,
        }
    }

    pub fn expires_at(&self) -> Option<Instant> {
        *self.expires_at.read()
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, `Some(ZERO)` once expired, or `None`
    /// if the entry was never touched.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at()
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }

    // == Evict ==
    /// Consumes the entry and fires its eviction callback, if any.
    ///
    /// A panicking callback is caught and logged so the remaining entries of
    /// a clear or sweep are still notified and the sweeper keeps running.
    pub(crate) fn evict(self, key: &str) {
        if let Some(on_evict) = &self.on_evict {
            let fired = panic::catch_unwind(AssertUnwindSafe(|| on_evict(key, &self.value)));
            if fired.is_err() {
                error!("Eviction callback for key '{}' panicked", key);
            }
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for CacheEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("value", &self.value)
            .field("ttl", &self.ttl)
            .field("expires_at", &self.expires_at())
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}
