//! Account balance and its stored encoding.
//!
//! Balances are non-negative integers. They are persisted as the base-10
//! ASCII rendering of the number and nothing else, so a value written by one
//! backend can be read back by any other.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(u64);

impl Balance {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Parse a balance supplied as a request argument.
    pub fn parse(s: &str) -> Result<Self, TypesError> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| TypesError::InvalidBalance(s.to_string()))
    }

    /// Encode for storage.
    pub fn encode(&self) -> Vec<u8> {
        self.0.to_string().into_bytes()
    }

    /// Decode a stored value. Fails on anything but a base-10 integer.
    pub fn decode(bytes: &[u8]) -> Result<Self, TypesError> {
        let s = std::str::from_utf8(bytes).map_err(|_| TypesError::NonUtf8Balance)?;
        Self::parse(s)
    }
}

impl FromStr for Balance {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
