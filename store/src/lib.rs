//! Abstract storage for the tally ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements
//! [`AccountStore`]. The ledger depends only on the trait.

pub mod account;
pub mod error;

pub use account::AccountStore;
pub use error::StoreError;
