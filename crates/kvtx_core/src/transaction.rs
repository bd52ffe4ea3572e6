//! Transactions over the store's mapping.
//!
//! A [`Transaction`] owns the store's lock for its whole lifetime: a shared
//! guard when read-only, an exclusive guard when writable. The guard is
//! acquired by [`Store::begin`](crate::Store::begin) and released when the
//! transaction is dropped, so a transaction can never be used after its lock
//! is gone.

use crate::error::{CoreError, CoreResult};
use crate::stats::StoreStats;
use crate::types::TransactionId;
use parking_lot::{RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

pub(crate) type Entries = HashMap<String, String>;

/// The lock mode a transaction holds.
enum Access<'db> {
    Read(RwLockReadGuard<'db, Entries>),
    Write(RwLockWriteGuard<'db, Entries>),
}

/// A handle for one unit of access to a [`Store`](crate::Store).
///
/// The access mode is fixed at creation. Read-only transactions share the
/// lock with other readers; writable transactions hold it exclusively.
///
/// The handle borrows the store and holds a lock guard, so it cannot outlive
/// the store and cannot be sent to another thread. The store itself can be
/// shared:
///
/// ```rust
/// use kvtx_core::Store;
/// use std::thread;
///
/// let store = Store::new();
/// thread::scope(|s| {
///     s.spawn(|| store.update(|tx| tx.set("k", "v")).unwrap());
/// });
/// assert_eq!(store.view(|tx| Ok(tx.get("k"))).unwrap(), "v");
/// ```
///
/// A transaction handed to another thread is rejected at compile time:
///
/// ```rust,compile_fail
/// use kvtx_core::Store;
/// use std::thread;
///
/// let store = Store::new();
/// let tx = store.begin(false).unwrap();
/// thread::scope(|s| {
///     s.spawn(move || tx.get("k"));
/// });
/// ```
pub struct Transaction<'db> {
    id: TransactionId,
    access: Access<'db>,
    stats: &'db StoreStats,
    log_values: bool,
}

impl<'db> Transaction<'db> {
    pub(crate) fn read(
        id: TransactionId,
        guard: RwLockReadGuard<'db, Entries>,
        stats: &'db StoreStats,
        log_values: bool,
    ) -> Self {
        Self {
            id,
            access: Access::Read(guard),
            stats,
            log_values,
        }
    }

    pub(crate) fn write(
        id: TransactionId,
        guard: RwLockWriteGuard<'db, Entries>,
        stats: &'db StoreStats,
        log_values: bool,
    ) -> Self {
        Self {
            id,
            access: Access::Write(guard),
            stats,
            log_values,
        }
    }

    /// Returns the transaction ID.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns true if this transaction holds the exclusive lock.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        matches!(self.access, Access::Write(_))
    }

    /// Returns the value stored under `key`.
    ///
    /// A missing key yields an empty string, the same as a key explicitly
    /// set to `""`. Use [`contains_key`](Self::contains_key) to tell the two
    /// apart.
    #[must_use]
    pub fn get(&self, key: &str) -> String {
        self.stats.record_get();
        self.entries().get(key).cloned().unwrap_or_default()
    }

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ReadOnlyTransaction`] if the transaction was
    /// opened read-only. The mapping is left untouched in that case.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> CoreResult<()> {
        let key = key.into();
        match &mut self.access {
            Access::Write(entries) => {
                let value = value.into();
                if self.log_values {
                    trace!(txid = %self.id, key = %key, value = %value, "set");
                } else {
                    trace!(txid = %self.id, key = %key, "set");
                }
                entries.insert(key, value);
                self.stats.record_set();
                Ok(())
            }
            Access::Read(_) => {
                self.stats.record_rejected_set();
                debug!(txid = %self.id, key = %key, "set refused on read-only transaction");
                Err(CoreError::read_only(key))
            }
        }
    }

    /// Returns true if `key` has been set.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    /// Returns the number of keys in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns true if the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> &Entries {
        match &self.access {
            Access::Read(guard) => &**guard,
            Access::Write(guard) => &**guard,
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        // The guard itself is released right after this, when fields drop.
        match self.access {
            Access::Write(_) => debug!(txid = %self.id, "write unlock"),
            Access::Read(_) => debug!(txid = %self.id, "read unlock"),
        }
    }
}

impl fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("writable", &self.is_writable())
            .finish_non_exhaustive()
    }
}
