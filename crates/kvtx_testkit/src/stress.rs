//! Stress tests for kvtx.
//!
//! These helpers hammer a shared store from several threads and report
//! throughput. The counter workload also checks that no update was lost,
//! which only holds if writers are exclusive.

use crate::fixtures::scenarios;
use kvtx_core::{CoreError, Store};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Key incremented by [`stress_counter_increments`].
pub const COUNTER_KEY: &str = "counter";

/// Outcome of one stress run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressTestResult {
    /// Operations whose transaction returned `Ok`.
    pub successful_ops: usize,
    /// Operations whose transaction returned `Err`.
    pub failed_ops: usize,
    /// Wall-clock time from the first thread spawn to the last join.
    pub elapsed: Duration,
}

impl StressTestResult {
    /// Returns the number of operations attempted.
    #[must_use]
    pub fn total_ops(&self) -> usize {
        self.successful_ops + self.failed_ops
    }

    /// Returns attempted operations per second, or 0 for an instant run.
    #[must_use]
    pub fn ops_per_second(&self) -> f64 {
        if self.elapsed.is_zero() {
            0.0
        } else {
            self.total_ops() as f64 / self.elapsed.as_secs_f64()
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform, split across threads.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Number of distinct keys.
    pub key_count: usize,
    /// One in `write_every` operations is an update; the rest are views.
    pub write_every: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            key_count: 100,
            write_every: 4,
        }
    }
}

/// Runs `per_thread` on each of `config.threads` threads and tallies the
/// returned successes and failures.
fn run_threads<F>(config: &StressConfig, per_thread: F) -> StressTestResult
where
    F: Fn(usize, usize) -> Result<(), CoreError> + Send + Sync + 'static,
{
    let per_thread = Arc::new(per_thread);
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let ops_per_thread = config.operations / config.threads.max(1);

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let per_thread = Arc::clone(&per_thread);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    match per_thread(t, i) {
                        Ok(()) => {
                            successful.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let result = StressTestResult {
        successful_ops: successful.load(Ordering::Relaxed),
        failed_ops: failed.load(Ordering::Relaxed),
        elapsed: start.elapsed(),
    };
    debug!(
        threads = config.threads,
        ops = result.total_ops(),
        failed = result.failed_ops,
        elapsed_ms = result.elapsed.as_millis() as u64,
        ops_per_second = result.ops_per_second(),
        "stress run finished"
    );
    result
}

/// Run a mixed read/write stress test.
pub fn stress_mixed_operations(store: Arc<Store>, config: &StressConfig) -> StressTestResult {
    let key_count = config.key_count.max(1);
    let write_every = config.write_every.max(1);

    run_threads(config, move |t, i| {
        let key = scenarios::key_name((t * 31 + i) % key_count);
        if i % write_every == 0 {
            store.update(|tx| tx.set(key, format!("t{t}-i{i}")))
        } else {
            store.view(|tx| {
                let _ = tx.get(&key);
                Ok(())
            })
        }
    })
}

/// Run a concurrent read stress test over a populated store.
pub fn stress_concurrent_reads(store: Arc<Store>, config: &StressConfig) -> StressTestResult {
    let key_count = config.key_count.max(1);

    run_threads(config, move |t, i| {
        let key = scenarios::key_name((t + i) % key_count);
        store.view(|tx| {
            if tx.contains_key(&key) {
                Ok(())
            } else {
                Err(CoreError::aborted(format!("{key} missing")))
            }
        })
    })
}

/// Run a stress test where every other update fails after writing.
///
/// Failures must not leak the lock; a leak shows up as a hang.
pub fn stress_callback_failures(store: Arc<Store>, config: &StressConfig) -> StressTestResult {
    let key_count = config.key_count.max(1);

    run_threads(config, move |t, i| {
        let key = scenarios::key_name((t + i) % key_count);
        store.update(|tx| {
            tx.set(key, "partial")?;
            if i % 2 == 0 {
                Err(CoreError::aborted("intentional"))
            } else {
                Ok(())
            }
        })
    })
}

/// Increments [`COUNTER_KEY`] once per operation from every thread.
///
/// Returns the run result and the final counter value, which equals the
/// number of successful operations unless an increment was lost.
pub fn stress_counter_increments(
    store: Arc<Store>,
    config: &StressConfig,
) -> (StressTestResult, u64) {
    let counter_store = Arc::clone(&store);
    let result = run_threads(config, move |_, _| {
        counter_store.update(|tx| {
            let current: u64 = match tx.get(COUNTER_KEY).as_str() {
                "" => 0,
                text => text.parse().map_err(CoreError::callback)?,
            };
            tx.set(COUNTER_KEY, (current + 1).to_string())
        })
    });

    let count = store
        .view(|tx| Ok(tx.get(COUNTER_KEY)))
        .ok()
        .and_then(|text| text.parse().ok())
        .unwrap_or(0);

    (result, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::shared_store;

    fn small_config() -> StressConfig {
        StressConfig {
            operations: 1_000,
            threads: 4,
            key_count: 16,
            ..Default::default()
        }
    }

    #[test]
    fn test_mixed_operations() {
        let result = stress_mixed_operations(shared_store(), &small_config());

        assert_eq!(result.total_ops(), 1_000);
        assert_eq!(result.failed_ops, 0);
        assert!(result.elapsed > Duration::ZERO);
        assert!(result.ops_per_second() > 0.0);
    }

    #[test]
    fn instant_run_reports_zero_throughput() {
        let result = StressTestResult {
            successful_ops: 10,
            failed_ops: 2,
            elapsed: Duration::ZERO,
        };

        assert_eq!(result.total_ops(), 12);
        assert_eq!(result.ops_per_second(), 0.0);
    }

    #[test]
    fn throughput_counts_failures() {
        let result = StressTestResult {
            successful_ops: 3,
            failed_ops: 1,
            elapsed: Duration::from_secs(2),
        };

        assert_eq!(result.ops_per_second(), 2.0);
    }

    #[test]
    fn test_concurrent_reads() {
        let config = small_config();
        let store = scenarios::populated_store(config.key_count);

        let result = stress_concurrent_reads(store, &config);

        assert_eq!(result.successful_ops, 1_000);
    }

    #[test]
    fn test_callback_failures_release_lock() {
        let store = shared_store();
        let result = stress_callback_failures(Arc::clone(&store), &small_config());

        assert_eq!(result.failed_ops, 500);
        assert_eq!(result.successful_ops, 500);
        assert_eq!(store.stats().callback_failures(), 500);
    }

    #[test]
    fn test_no_lost_increments() {
        let (result, count) = stress_counter_increments(shared_store(), &small_config());

        assert_eq!(result.failed_ops, 0);
        assert_eq!(count, result.successful_ops as u64);
    }
}
