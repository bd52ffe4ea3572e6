//! Store fixtures and common scenarios.

use kvtx_core::{Config, Store};
use std::sync::Arc;

/// Runs a test with a fresh store.
///
/// # Example
///
/// ```rust
/// use kvtx_testkit::with_store;
///
/// with_store(|store| {
///     assert_eq!(store.view(|tx| Ok(tx.len())).unwrap(), 0);
/// });
/// ```
pub fn with_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store) -> R,
{
    let store = Store::new();
    f(&store)
}

/// Creates a fresh store ready to be shared across threads.
pub fn shared_store() -> Arc<Store> {
    Arc::new(Store::with_config(Config::new().log_values(true)))
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a store with `count` entries named `key-{i}` -> `value-{i}`.
    pub fn populated_store(count: usize) -> Arc<Store> {
        let store = shared_store();
        store
            .update(|tx| {
                for i in 0..count {
                    tx.set(key_name(i), format!("value-{i}"))?;
                }
                Ok(())
            })
            .expect("Failed to populate store");
        store
    }

    /// Returns the key used for entry `i` by [`populated_store`].
    pub fn key_name(i: usize) -> String {
        format!("key-{i}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_store() {
        let len = with_store(|store| store.view(|tx| Ok(tx.len())).unwrap());
        assert_eq!(len, 0);
    }

    #[test]
    fn test_populated_scenario() {
        let store = scenarios::populated_store(10);
        let (len, last) = store
            .view(|tx| Ok((tx.len(), tx.get(&scenarios::key_name(9)))))
            .unwrap();

        assert_eq!(len, 10);
        assert_eq!(last, "value-9");
    }
}
