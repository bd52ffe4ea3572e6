//! # kvtx Testkit
//!
//! Test utilities for kvtx.
//!
//! This crate provides:
//! - Store fixtures and canned scenarios
//! - Property-based test generators using proptest
//! - Concurrency probes that observe how transactions wait on each other
//! - Stress testing utilities
//!
//! ## Usage
//!
//! ```rust
//! use kvtx_testkit::prelude::*;
//!
//! with_store(|store| {
//!     store.update(|tx| tx.set("k", "v")).unwrap();
//!     assert_eq!(store.view(|tx| Ok(tx.get("k"))).unwrap(), "v");
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod probe;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::probe::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use probe::*;
pub use stress::*;
