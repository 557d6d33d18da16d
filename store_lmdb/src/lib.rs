//! LMDB storage backend for the tally ledger.
//!
//! Implements [`tally_store::AccountStore`] using the `heed` LMDB bindings.
//! All accounts live in a single named database within one environment.

pub mod account;
pub mod environment;
pub mod error;

pub use account::LmdbAccountStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
