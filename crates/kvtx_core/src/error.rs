//! Error types for kvtx core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in kvtx core operations.
///
/// Errors produced by a transaction callback are handed back by
/// [`Store::view`](crate::Store::view) and [`Store::update`](crate::Store::update)
/// unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The store has been closed and no longer begins transactions.
    #[error("store is closed")]
    StoreClosed,

    /// A write was attempted through a read-only transaction.
    #[error("cannot set key {key:?}: transaction is read-only")]
    ReadOnlyTransaction {
        /// The key the caller tried to write.
        key: String,
    },

    /// The callback gave up on the transaction.
    ///
    /// Writes applied before the abort stay in the store.
    #[error("transaction aborted: {reason}")]
    Aborted {
        /// Reason for abort.
        reason: String,
    },

    /// An application error raised inside a transaction callback.
    #[error("transaction callback failed: {0}")]
    Callback(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CoreError {
    /// Creates a read-only transaction error.
    pub fn read_only(key: impl Into<String>) -> Self {
        Self::ReadOnlyTransaction { key: key.into() }
    }

    /// Creates a transaction aborted error.
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted {
            reason: reason.into(),
        }
    }

    /// Wraps an application error raised inside a callback.
    pub fn callback<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Callback(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn read_only_message_names_key() {
        let err = CoreError::read_only("mykey");
        assert_eq!(
            err.to_string(),
            "cannot set key \"mykey\": transaction is read-only"
        );
    }

    #[test]
    fn callback_keeps_source() {
        let io = std::io::Error::other("disk on fire");
        let err = CoreError::callback(io);

        assert!(err.to_string().contains("disk on fire"));
        assert!(err.source().is_some());
    }

    #[test]
    fn callback_from_str() {
        let err = CoreError::callback("bad input");
        assert!(matches!(err, CoreError::Callback(_)));
        assert_eq!(err.to_string(), "transaction callback failed: bad input");
    }
}
