//! TTL Sweeper Task
//!
//! Background task that periodically removes expired cache entries and fires
//! their eviction callbacks.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use tokio::runtime::Builder;
use tokio::sync::{watch, Notify};
use tracing::{debug, info};

use crate::config::{StoreConfig, SweepPolicy};
use crate::error::Result;

/// Shortest delay the sweeper will ever wait between passes.
pub(crate) const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Name of the OS thread the sweeper runs on.
const SWEEPER_THREAD_NAME: &str = "ttl-cache-sweeper";

// == Sweep Target ==
/// State a sweeper can scan and evict from.
pub(crate) trait SweepTarget: Send + Sync + 'static {
    /// Removes every expired entry, firing callbacks. Returns how many were removed.
    fn sweep_expired(&self) -> usize;
    /// Earliest expiration instant among held entries.
    fn next_expiry(&self) -> Option<Instant>;
    /// Smallest TTL among held entries.
    fn min_ttl(&self) -> Option<Duration>;
}

// == Schedule ==
#[derive(Debug, Clone, Copy)]
enum Schedule {
    Fixed(Duration),
    Adaptive { max: Duration },
}

impl Schedule {
    fn from_config<S: SweepTarget>(config: &StoreConfig, target: &S) -> Self {
        match config.sweep_policy {
            SweepPolicy::Fixed => {
                Schedule::Fixed(fixed_interval(target.min_ttl(), config.sweep_interval))
            }
            SweepPolicy::Adaptive => Schedule::Adaptive {
                max: config.sweep_interval,
            },
        }
    }

    fn next_delay<S: SweepTarget>(&self, target: &S) -> Duration {
        match *self {
            Schedule::Fixed(interval) => interval,
            Schedule::Adaptive { max } => adaptive_delay(target.next_expiry(), Instant::now(), max),
        }
    }
}

/// Interval used by the fixed policy: the smallest TTL present when the store
/// is built if it is below the default, the default otherwise.
pub(crate) fn fixed_interval(min_ttl: Option<Duration>, default: Duration) -> Duration {
    match min_ttl {
        Some(ttl) if ttl < default => ttl.max(MIN_SWEEP_INTERVAL),
        _ => default,
    }
}

/// Delay used by the adaptive policy: just past the earliest expiry, capped at `max`.
///
/// Expiry is strict (`expires_at < now`), so the pass is scheduled one
/// minimum interval after the deadline.
pub(crate) fn adaptive_delay(next_expiry: Option<Instant>, now: Instant, max: Duration) -> Duration {
    match next_expiry {
        Some(deadline) => (deadline.saturating_duration_since(now) + MIN_SWEEP_INTERVAL)
            .clamp(MIN_SWEEP_INTERVAL, max.max(MIN_SWEEP_INTERVAL)),
        None => max,
    }
}

// == Sweeper ==
/// Handle to a running sweeper.
///
/// The task stops when [`stop`](Sweeper::stop) is called, when this handle is
/// dropped, or when the swept state is dropped.
#[derive(Debug)]
pub struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    wake: Arc<Notify>,
    policy: SweepPolicy,
    interval: Duration,
}

impl Sweeper {
    /// Starts sweeping `target`.
    ///
    /// Always runs on a dedicated thread driving its own single-threaded
    /// runtime, even when called from inside a tokio runtime: the sweeper
    /// must outlive the caller's runtime and must not compete with blocking
    /// callers for its worker threads.
    pub(crate) fn spawn<S: SweepTarget>(target: &Arc<S>, config: &StoreConfig) -> Result<Self> {
        let schedule = Schedule::from_config(config, &**target);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let wake = Arc::new(Notify::new());

        let task = run(Arc::downgrade(target), schedule, wake.clone(), shutdown_rx);
        spawn_dedicated(task)?;

        Ok(Self {
            shutdown_tx,
            wake,
            policy: config.sweep_policy,
            interval: config.sweep_interval,
        })
    }

    /// Wakes the task so it can reschedule around an entry with this TTL.
    ///
    /// Only the adaptive policy reschedules, and only for TTLs shorter than
    /// the configured interval.
    pub fn reschedule_for(&self, ttl: Duration) {
        if self.policy == SweepPolicy::Adaptive && ttl < self.interval {
            self.wake.notify_one();
        }
    }

    /// Signals the task to stop. Idempotent.
    pub fn stop(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Returns true until the task has exited.
    pub fn is_running(&self) -> bool {
        !self.shutdown_tx.is_closed()
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_dedicated<F>(task: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let runtime = Builder::new_current_thread().enable_time().build()?;
    thread::Builder::new()
        .name(SWEEPER_THREAD_NAME.to_string())
        .spawn(move || runtime.block_on(task))?;
    Ok(())
}

async fn run<S: SweepTarget>(
    target: Weak<S>,
    schedule: Schedule,
    wake: Arc<Notify>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!(?schedule, "Starting TTL sweeper");

    loop {
        let delay = match target.upgrade() {
            Some(state) => schedule.next_delay(&*state),
            None => break,
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                let Some(state) = target.upgrade() else { break };
                let removed = state.sweep_expired();

                if removed > 0 {
                    info!("TTL sweep: removed {} expired entries", removed);
                } else {
                    debug!("TTL sweep: no expired entries found");
                }
            }
            _ = wake.notified() => {
                debug!("TTL sweeper woken to reschedule");
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    info!("TTL sweeper stopped");
}
