//! Read/write footprints of ledger operations.
//!
//! An external concurrency controller orders or rejects transactions whose
//! footprints overlap. The ledger records the footprint by running each
//! operation against a [`TrackingStore`].

use std::cell::RefCell;
use std::collections::BTreeSet;

use serde::Serialize;

use tally_store::{AccountStore, StoreError};
use tally_types::AccountKey;

/// Keys an operation read and keys it wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Footprint {
    pub reads: BTreeSet<AccountKey>,
    pub writes: BTreeSet<AccountKey>,
}

impl Footprint {
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty() && self.writes.is_empty()
    }

    pub fn touches(&self, key: &AccountKey) -> bool {
        self.reads.contains(key) || self.writes.contains(key)
    }

    /// True when the two operations cannot be reordered freely: one writes
    /// a key the other reads or writes.
    pub fn conflicts_with(&self, other: &Footprint) -> bool {
        !self.writes.is_disjoint(&other.writes)
            || !self.writes.is_disjoint(&other.reads)
            || !self.reads.is_disjoint(&other.writes)
    }
}

/// Store wrapper that records every key it is asked to read or write.
pub struct TrackingStore<S> {
    inner: S,
    footprint: RefCell<Footprint>,
}

impl<S: AccountStore> TrackingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            footprint: RefCell::new(Footprint::default()),
        }
    }

    pub fn into_footprint(self) -> Footprint {
        self.footprint.into_inner()
    }

    fn record_read(&self, key: &AccountKey) {
        self.footprint.borrow_mut().reads.insert(key.clone());
    }

    fn record_write(&self, key: &AccountKey) {
        self.footprint.borrow_mut().writes.insert(key.clone());
    }
}

impl<S: AccountStore> AccountStore for TrackingStore<S> {
    fn get(&self, key: &AccountKey) -> Result<Option<Vec<u8>>, StoreError> {
        self.record_read(key);
        self.inner.get(key)
    }

    fn put(&self, key: &AccountKey, value: &[u8]) -> Result<(), StoreError> {
        self.record_write(key);
        self.inner.put(key, value)
    }

    fn delete(&self, key: &AccountKey) -> Result<(), StoreError> {
        self.record_write(key);
        self.inner.delete(key)
    }

    fn supports_atomic_batch(&self) -> bool {
        self.inner.supports_atomic_batch()
    }

    fn put_all(&self, entries: &[(AccountKey, Vec<u8>)]) -> Result<(), StoreError> {
        for (key, _) in entries {
            self.record_write(key);
        }
        self.inner.put_all(entries)
    }
}
