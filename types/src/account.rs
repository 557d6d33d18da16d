//! Account key type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a ledger account.
///
/// Keys are opaque: any string is accepted and stored byte-for-byte. An
/// account exists exactly when the store holds a value under its key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountKey(String);

impl AccountKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Key of the `index`-th account created by a bulk initialisation,
    /// e.g. `acc0`, `acc1`, ... for the prefix `acc`.
    pub fn sequential(prefix: &str, index: u64) -> Self {
        Self(format!("{prefix}{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
