use thiserror::Error;

/// A fault in the storage substrate.
///
/// A missing key is never an error: lookups report absence as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),

    #[error("injected fault: {0}")]
    Injected(String),
}
