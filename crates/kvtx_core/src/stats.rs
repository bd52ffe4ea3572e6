//! Store statistics.
//!
//! Counters are updated as transactions run and can be read at any time,
//! including while other threads hold the store lock.
//!
//! ```rust
//! use kvtx_core::Store;
//!
//! let store = Store::new();
//! store.update(|tx| tx.set("k", "v")).unwrap();
//!
//! let snap = store.stats().snapshot();
//! assert_eq!(snap.write_transactions, 1);
//! assert_eq!(snap.sets, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Store statistics.
///
/// All counters are atomic and monotonically increasing.
#[derive(Debug, Default)]
pub struct StoreStats {
    /// Read-only transactions that acquired the lock.
    read_transactions: AtomicU64,
    /// Read-write transactions that acquired the lock.
    write_transactions: AtomicU64,
    /// Managed calls whose callback returned an error.
    callback_failures: AtomicU64,
    /// `get` calls.
    gets: AtomicU64,
    /// Successful `set` calls.
    sets: AtomicU64,
    /// `set` calls rejected because the transaction was read-only.
    rejected_sets: AtomicU64,
}

impl StoreStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_begin(&self, writable: bool) {
        if writable {
            self.write_transactions.fetch_add(1, Ordering::Relaxed);
        } else {
            self.read_transactions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_callback_failure(&self) {
        self.callback_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected_set(&self) {
        self.rejected_sets.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of read-only transactions started.
    pub fn read_transactions(&self) -> u64 {
        self.read_transactions.load(Ordering::Relaxed)
    }

    /// Returns the number of read-write transactions started.
    pub fn write_transactions(&self) -> u64 {
        self.write_transactions.load(Ordering::Relaxed)
    }

    /// Returns the number of callbacks that returned an error.
    pub fn callback_failures(&self) -> u64 {
        self.callback_failures.load(Ordering::Relaxed)
    }

    /// Returns the number of `get` calls.
    pub fn gets(&self) -> u64 {
        self.gets.load(Ordering::Relaxed)
    }

    /// Returns the number of applied `set` calls.
    pub fn sets(&self) -> u64 {
        self.sets.load(Ordering::Relaxed)
    }

    /// Returns the number of `set` calls refused on read-only transactions.
    pub fn rejected_sets(&self) -> u64 {
        self.rejected_sets.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all stats.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            read_transactions: self.read_transactions(),
            write_transactions: self.write_transactions(),
            callback_failures: self.callback_failures(),
            gets: self.gets(),
            sets: self.sets(),
            rejected_sets: self.rejected_sets(),
        }
    }
}

/// A point-in-time snapshot of store statistics.
///
/// Counters are read one at a time, so a snapshot taken while transactions
/// are running is not guaranteed to be mutually consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Read-only transactions started.
    pub read_transactions: u64,
    /// Read-write transactions started.
    pub write_transactions: u64,
    /// Callbacks that returned an error.
    pub callback_failures: u64,
    /// `get` calls.
    pub gets: u64,
    /// Applied `set` calls.
    pub sets: u64,
    /// Refused `set` calls.
    pub rejected_sets: u64,
}

impl StatsSnapshot {
    /// Returns the total number of transactions started.
    #[must_use]
    pub fn transactions(&self) -> u64 {
        self.read_transactions + self.write_transactions
    }
}
