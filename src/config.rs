//! Configuration Module
//!
//! Handles loading and managing store configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default upper bound between two sweeper passes.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

// == Sweep Policy ==
/// How the sweeper chooses when to run its next pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepPolicy {
    /// Interval chosen once when the store is built and never recomputed.
    Fixed,
    /// Next pass scheduled at the earliest expiry among held entries,
    /// capped at the configured interval.
    #[default]
    Adaptive,
}

impl FromStr for SweepPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(SweepPolicy::Fixed),
            "adaptive" => Ok(SweepPolicy::Adaptive),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown sweep policy '{}'",
                other
            ))),
        }
    }
}

/// Store configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Default (and, under the adaptive policy, maximum) time between sweeps
    pub sweep_interval: Duration,
    /// Scheduling policy of the background sweeper
    pub sweep_policy: SweepPolicy,
}

impl StoreConfig {
    /// Creates a new StoreConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `TTL_CACHE_SWEEP_INTERVAL_MS` - Sweep interval in milliseconds (default: 1000)
    /// - `TTL_CACHE_SWEEP_POLICY` - `fixed` or `adaptive` (default: adaptive)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sweep_interval: env::var("TTL_CACHE_SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.sweep_interval),
            sweep_policy: env::var("TTL_CACHE_SWEEP_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_policy),
        }
    }

    /// Sets the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Sets the sweep scheduling policy.
    pub fn with_sweep_policy(mut self, policy: SweepPolicy) -> Self {
        self.sweep_policy = policy;
        self
    }

    /// Checks that the configuration can drive a sweeper.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            sweep_policy: SweepPolicy::Adaptive,
        }
    }
}
