//! Account ledger over a flat key → balance store.
//!
//! Accounts are created, queried, deleted and moved between through a small
//! fixed operation set. A caller submits an operation name plus string
//! arguments; the request is parsed into a typed [`Request`], run against an
//! injected [`tally_store::AccountStore`], and answered with either an
//! [`Outcome`] (payload plus read/write [`Footprint`]) or a coded [`Failure`].
//!
//! Concurrency control is the caller's business: every operation runs
//! synchronously and the footprint tells the caller what it touched.

pub mod config;
pub mod error;
pub mod footprint;
pub mod ledger;
pub mod operations;
pub mod request;

pub use config::LedgerConfig;
pub use error::{ErrorCode, Failure, LedgerError};
pub use footprint::{Footprint, TrackingStore};
pub use ledger::{Ledger, Outcome, Response};
pub use request::{Operation, Request};
