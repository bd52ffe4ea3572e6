//! # kvtx Core
//!
//! An in-memory key-value store with a transactional access model.
//!
//! This crate provides:
//! - A single shared `String -> String` mapping owned by a [`Store`]
//! - Read-only and read-write [`Transaction`]s guarded by a reader/writer lock
//! - Managed execution via [`Store::view`] and [`Store::update`], which always
//!   release the lock when the callback returns, fails, or panics
//!
//! ## Example
//!
//! ```rust
//! use kvtx_core::Store;
//!
//! let store = Store::new();
//!
//! store.update(|tx| {
//!     tx.set("mykey", "go")?;
//!     tx.set("mykey2", "is")?;
//!     tx.set("mykey3", "awesome")?;
//!     Ok(())
//! }).unwrap();
//!
//! let value = store.view(|tx| Ok(tx.get("mykey3"))).unwrap();
//! assert_eq!(value, "awesome");
//! ```
//!
//! ## Concurrency
//!
//! Any number of read transactions may run at once. A write transaction waits
//! for every holder to release and excludes all other transactions while it
//! runs. The lock is task-fair, so a waiting writer blocks new readers.
//!
//! There is no rollback: a failing callback keeps every `set` it already
//! applied.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod stats;
mod store;
mod transaction;
mod types;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use stats::{StatsSnapshot, StoreStats};
pub use store::Store;
pub use transaction::Transaction;
pub use types::TransactionId;

/// Crate version, as reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
