//! LMDB implementation of AccountStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use tally_store::{AccountStore, StoreError};
use tally_types::AccountKey;

use crate::LmdbError;

/// Account store backed by one LMDB database.
///
/// Each call runs in its own LMDB transaction; `put_all` runs all of its
/// entries in a single write transaction and is therefore atomic.
pub struct LmdbAccountStore {
    pub(crate) env: Arc<Env>,
    pub(crate) accounts_db: Database<Bytes, Bytes>,
}

impl LmdbAccountStore {
    /// Number of accounts currently stored.
    pub fn len(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.accounts_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl AccountStore for LmdbAccountStore {
    fn get(&self, key: &AccountKey) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .accounts_db
            .get(&rtxn, key.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(val.map(|v| v.to_vec()))
    }

    fn put(&self, key: &AccountKey, value: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.accounts_db
            .put(&mut wtxn, key.as_bytes(), value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete(&self, key: &AccountKey) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.accounts_db
            .delete(&mut wtxn, key.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn supports_atomic_batch(&self) -> bool {
        true
    }

    fn put_all(&self, entries: &[(AccountKey, Vec<u8>)]) -> Result<(), StoreError> {
        // Dropping the transaction on an early return aborts every entry.
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for (key, value) in entries {
            self.accounts_db
                .put(&mut wtxn, key.as_bytes(), value)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
