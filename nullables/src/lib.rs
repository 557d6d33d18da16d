//! Nullable infrastructure for deterministic testing.
//!
//! The ledger reaches its storage only through the `AccountStore` trait.
//! This crate provides an in-memory implementation that:
//! - Never touches the filesystem
//! - Can be inspected after the fact (write counts, snapshots)
//! - Can be told to fail specific operations on specific keys
//!
//! Usage: swap the LMDB store for [`NullStore`] in tests.

pub mod store;

pub use store::NullStore;
