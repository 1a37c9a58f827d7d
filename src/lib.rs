//! TTL Cache - An in-process, thread-safe key/value store
//!
//! Every entry carries a time-to-live and is removed by a background sweeper
//! once stale, firing an optional eviction callback.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{evict_callback, CacheStats, EvictCallback, Store};
pub use config::{StoreConfig, SweepPolicy};
pub use error::{CacheError, Result};
