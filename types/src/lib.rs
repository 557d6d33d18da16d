//! Fundamental types for the tally ledger.
//!
//! Defines the types shared across every other crate in the workspace:
//! account keys, balances and their on-disk encoding.

pub mod account;
pub mod balance;
pub mod error;

pub use account::AccountKey;
pub use balance::Balance;
pub use error::TypesError;
