//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a store.
//!
//! # Tasks
//! - TTL Sweeper: Removes expired cache entries and fires their eviction callbacks

mod sweeper;

pub(crate) use sweeper::SweepTarget;
pub use sweeper::Sweeper;
