//! Store facade and managed execution.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::stats::StoreStats;
use crate::transaction::{Entries, Transaction};
use crate::types::TransactionId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info};

/// The store handle.
///
/// `Store` owns one `String -> String` mapping and the reader/writer lock
/// guarding it. The mapping is only reachable through a [`Transaction`],
/// and a transaction only exists while it holds the lock.
///
/// # Managed Transactions
///
/// [`view`](Self::view) and [`update`](Self::update) run a callback inside a
/// read-only or read-write transaction and release the lock when the
/// callback finishes, whatever its outcome:
///
/// ```rust
/// use kvtx_core::{CoreError, Store};
///
/// let store = Store::new();
///
/// let result: Result<(), CoreError> = store.update(|tx| {
///     tx.set("a", "1")?;
///     Err(CoreError::aborted("changed my mind"))
/// });
/// assert!(result.is_err());
///
/// // No rollback: the write before the failure is kept, and the lock is free.
/// assert_eq!(store.view(|tx| Ok(tx.get("a"))).unwrap(), "1");
/// ```
///
/// # Sharing
///
/// `Store` is `Send + Sync`. Wrap it in an `Arc` to use it from several
/// threads; every call blocks until the requested lock mode is available.
pub struct Store {
    /// Configuration.
    config: Config,
    /// The key/value mapping and its lock.
    data: RwLock<Entries>,
    /// Next transaction ID.
    next_txid: AtomicU64,
    /// Whether the store still begins transactions.
    is_open: AtomicBool,
    /// Counters.
    stats: StoreStats,
}

impl Store {
    /// Creates an empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty store with a custom configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            data: RwLock::new(HashMap::with_capacity(config.initial_capacity)),
            config,
            next_txid: AtomicU64::new(1),
            is_open: AtomicBool::new(true),
            stats: StoreStats::new(),
        }
    }

    /// Runs `f` inside a read-only transaction.
    ///
    /// Blocks until no writer holds or awaits the lock. Whatever `f` returns
    /// is returned unchanged, and the shared lock is released before this
    /// returns.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StoreClosed`] if the store is closed, otherwise
    /// the callback's own error.
    pub fn view<F, T>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> CoreResult<T>,
    {
        self.managed(false, f)
    }

    /// Runs `f` inside a read-write transaction.
    ///
    /// Blocks until every reader and writer has released the lock. Writes
    /// applied by `f` are kept even if it then fails.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StoreClosed`] if the store is closed, otherwise
    /// the callback's own error.
    pub fn update<F, T>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> CoreResult<T>,
    {
        self.managed(true, f)
    }

    /// Begins a transaction, blocking until its lock is acquired.
    ///
    /// The lock is held until the returned transaction is dropped. Prefer
    /// [`view`](Self::view) and [`update`](Self::update), which scope the
    /// transaction for you.
    ///
    /// ```rust
    /// use kvtx_core::Store;
    ///
    /// let store = Store::new();
    /// let mut tx = store.begin(true).unwrap();
    /// tx.set("k", "v").unwrap();
    /// drop(tx); // releases the write lock
    ///
    /// assert_eq!(store.begin(false).unwrap().get("k"), "v");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StoreClosed`] if the store is closed.
    pub fn begin(&self, writable: bool) -> CoreResult<Transaction<'_>> {
        self.ensure_open()?;

        let id = TransactionId::new(self.next_txid.fetch_add(1, Ordering::SeqCst));
        let txn = if writable {
            Transaction::write(id, self.data.write(), &self.stats, self.config.log_values)
        } else {
            Transaction::read(id, self.data.read(), &self.stats, self.config.log_values)
        };

        self.stats.record_begin(writable);
        debug!(txid = %id, writable, "lock acquired");
        Ok(txn)
    }

    /// Begins a transaction, runs `f`, and releases the lock.
    ///
    /// The transaction is dropped on every exit path, including unwinding,
    /// so the lock cannot leak.
    fn managed<F, T>(&self, writable: bool, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> CoreResult<T>,
    {
        let mut txn = self.begin(writable)?;
        let result = f(&mut txn);

        if let Err(ref err) = result {
            self.stats.record_callback_failure();
            debug!(txid = %txn.id(), error = %err, "transaction callback failed");
        }

        result
    }

    /// Closes the store.
    ///
    /// Afterwards `begin`, `view` and `update` fail with
    /// [`CoreError::StoreClosed`]. Transactions that already hold or are
    /// waiting for the lock are not affected. Closing twice is a no-op.
    pub fn close(&self) {
        if self.is_open.swap(false, Ordering::SeqCst) {
            info!("store closed");
        }
    }

    /// Checks if the store is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::SeqCst)
    }

    /// Returns store configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns store statistics.
    #[must_use]
    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(CoreError::StoreClosed)
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never touches the lock, so it is safe to log from inside a transaction.
        f.debug_struct("Store")
            .field("is_open", &self.is_open())
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}
