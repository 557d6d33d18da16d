//! Account storage trait.

use std::sync::Arc;

use tally_types::AccountKey;

use crate::StoreError;

/// Flat key → balance-bytes storage.
///
/// Implementations make every single `put` or `delete` all-or-nothing. No
/// grouping across keys is promised unless [`supports_atomic_batch`]
/// returns `true`.
///
/// [`supports_atomic_batch`]: AccountStore::supports_atomic_batch
pub trait AccountStore {
    /// Read the value stored under `key`. `Ok(None)` means absent.
    fn get(&self, key: &AccountKey) -> Result<Option<Vec<u8>>, StoreError>;

    /// Insert or overwrite the value under `key`.
    fn put(&self, key: &AccountKey, value: &[u8]) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key succeeds.
    fn delete(&self, key: &AccountKey) -> Result<(), StoreError>;

    fn exists(&self, key: &AccountKey) -> Result<bool, StoreError> {
        self.get(key).map(|v| v.is_some())
    }

    /// Whether [`put_all`](AccountStore::put_all) commits its entries as one unit.
    fn supports_atomic_batch(&self) -> bool {
        false
    }

    /// Write a group of entries, in order.
    ///
    /// The default issues one `put` per entry and stops at the first fault,
    /// leaving earlier entries written.
    fn put_all(&self, entries: &[(AccountKey, Vec<u8>)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.put(key, value)?;
        }
        Ok(())
    }
}

impl<S: AccountStore + ?Sized> AccountStore for &S {
    fn get(&self, key: &AccountKey) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &AccountKey, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &AccountKey) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn exists(&self, key: &AccountKey) -> Result<bool, StoreError> {
        (**self).exists(key)
    }

    fn supports_atomic_batch(&self) -> bool {
        (**self).supports_atomic_batch()
    }

    fn put_all(&self, entries: &[(AccountKey, Vec<u8>)]) -> Result<(), StoreError> {
        (**self).put_all(entries)
    }
}

impl<S: AccountStore + ?Sized> AccountStore for Arc<S> {
    fn get(&self, key: &AccountKey) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &AccountKey, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &AccountKey) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn exists(&self, key: &AccountKey) -> Result<bool, StoreError> {
        (**self).exists(key)
    }

    fn supports_atomic_batch(&self) -> bool {
        (**self).supports_atomic_batch()
    }

    fn put_all(&self, entries: &[(AccountKey, Vec<u8>)]) -> Result<(), StoreError> {
        (**self).put_all(entries)
    }
}

impl<S: AccountStore + ?Sized> AccountStore for Box<S> {
    fn get(&self, key: &AccountKey) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &AccountKey, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &AccountKey) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn exists(&self, key: &AccountKey) -> Result<bool, StoreError> {
        (**self).exists(key)
    }

    fn supports_atomic_batch(&self) -> bool {
        (**self).supports_atomic_batch()
    }

    fn put_all(&self, entries: &[(AccountKey, Vec<u8>)]) -> Result<(), StoreError> {
        (**self).put_all(entries)
    }
}
