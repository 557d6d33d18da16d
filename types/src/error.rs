//! Errors raised while interpreting ledger values.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("not a non-negative integer: {0:?}")]
    InvalidBalance(String),

    #[error("stored balance is not valid UTF-8")]
    NonUtf8Balance,
}
