//! Cache Module
//!
//! Provides an in-memory key/value store with per-entry TTL expiration and
//! eviction notifications.

mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{evict_callback, CacheEntry, EvictCallback, MAX_TTL};
pub use stats::CacheStats;
pub use store::Store;
