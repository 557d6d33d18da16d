//! Nullable store: thread-safe in-memory storage for testing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tally_store::{AccountStore, StoreError};
use tally_types::AccountKey;

/// An in-memory account store for testing.
///
/// Puts are applied one key at a time, so [`put_all`](AccountStore::put_all)
/// is not atomic here. That makes the ledger's compensation path reachable
/// from tests.
pub struct NullStore {
    entries: Mutex<HashMap<AccountKey, Vec<u8>>>,
    faults: Mutex<Faults>,
    writes: AtomicU64,
}

#[derive(Default)]
struct Faults {
    puts: HashMap<AccountKey, PutFault>,
    gets: HashSet<AccountKey>,
}

/// Let `skip` puts through, then fail the next `remaining` ones.
struct PutFault {
    skip: u32,
    remaining: u32,
}

const PERSISTENT: u32 = u32::MAX;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            faults: Mutex::new(Faults::default()),
            writes: AtomicU64::new(0),
        }
    }

    /// A store pre-populated with raw values. Seeding does not count as writes.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<AccountKey>,
        V: Into<Vec<u8>>,
    {
        let store = Self::new();
        {
            let mut map = lock(&store.entries);
            for (k, v) in entries {
                map.insert(k.into(), v.into());
            }
        }
        store
    }

    /// Fail the next `times` puts to `key`.
    pub fn fail_puts(&self, key: &AccountKey, times: u32) {
        self.fail_puts_after(key, 0, times);
    }

    /// Let `skip` puts to `key` succeed, then fail the following `times`.
    pub fn fail_puts_after(&self, key: &AccountKey, skip: u32, times: u32) {
        lock(&self.faults).puts.insert(
            key.clone(),
            PutFault {
                skip,
                remaining: times,
            },
        );
    }

    /// Fail every put to `key` until [`clear_faults`](Self::clear_faults).
    pub fn fail_puts_always(&self, key: &AccountKey) {
        self.fail_puts(key, PERSISTENT);
    }

    /// Fail every get of `key` until [`clear_faults`](Self::clear_faults).
    pub fn fail_gets(&self, key: &AccountKey) {
        lock(&self.faults).gets.insert(key.clone());
    }

    pub fn clear_faults(&self) {
        let mut faults = lock(&self.faults);
        faults.puts.clear();
        faults.gets.clear();
    }

    /// Number of puts and deletes that reached the map.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> BTreeMap<AccountKey, Vec<u8>> {
        lock(&self.entries)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take_put_fault(&self, key: &AccountKey) -> Option<StoreError> {
        let mut faults = lock(&self.faults);
        let fault = faults.puts.get_mut(key)?;
        if fault.skip > 0 {
            fault.skip -= 1;
            return None;
        }
        if fault.remaining == 0 {
            return None;
        }
        if fault.remaining != PERSISTENT {
            fault.remaining -= 1;
        }
        Some(StoreError::Injected(format!("put {key}")))
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for NullStore {
    fn get(&self, key: &AccountKey) -> Result<Option<Vec<u8>>, StoreError> {
        if lock(&self.faults).gets.contains(key) {
            return Err(StoreError::Injected(format!("get {key}")));
        }
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn put(&self, key: &AccountKey, value: &[u8]) -> Result<(), StoreError> {
        if let Some(err) = self.take_put_fault(key) {
            return Err(err);
        }
        lock(&self.entries).insert(key.clone(), value.to_vec());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn delete(&self, key: &AccountKey) -> Result<(), StoreError> {
        lock(&self.entries).remove(key);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
