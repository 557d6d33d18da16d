//! The ledger operations, each taking the store it acts on.
//!
//! Operations keep no state between calls. Reads always precede writes, and
//! every validation failure is reported before anything is written.

use tally_store::{AccountStore, StoreError};
use tally_types::{AccountKey, Balance};

use crate::{LedgerConfig, LedgerError};

/// Create `account_count` sequentially named accounts holding
/// `initial_balance`, overwriting any existing values.
///
/// Each put is retried up to `init_put_attempts` times; a fault that
/// outlasts the retries aborts the initialisation. Accounts created before
/// the fault stay in place.
pub fn init<S: AccountStore + ?Sized>(
    store: &S,
    config: &LedgerConfig,
    account_count: u64,
    initial_balance: Balance,
) -> Result<(), LedgerError> {
    let value = initial_balance.encode();
    let attempts = config.init_put_attempts.max(1);
    for index in 0..account_count {
        let key = AccountKey::sequential(&config.account_prefix, index);
        put_with_retry(store, &key, &value, attempts)?;
    }
    tracing::info!(
        accounts = account_count,
        balance = %initial_balance,
        "initialized accounts"
    );
    Ok(())
}

fn put_with_retry<S: AccountStore + ?Sized>(
    store: &S,
    key: &AccountKey,
    value: &[u8],
    attempts: u32,
) -> Result<(), StoreError> {
    let mut attempt = 1;
    loop {
        match store.put(key, value) {
            Ok(()) => return Ok(()),
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    account = %key,
                    attempt,
                    error = %e,
                    "put failed during init, retrying"
                );
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(account = %key, attempts, error = %e, "giving up on init put");
                return Err(e);
            }
        }
    }
}

/// Create a single account. Fails if the key already holds a value.
pub fn open<S: AccountStore + ?Sized>(
    store: &S,
    account: &AccountKey,
    initial_balance: Balance,
) -> Result<(), LedgerError> {
    if store.exists(account)? {
        return Err(LedgerError::AlreadyExists(account.clone()));
    }
    store.put(account, &initial_balance.encode())?;
    Ok(())
}

/// Remove an account. Removing a missing account succeeds.
pub fn delete<S: AccountStore + ?Sized>(
    store: &S,
    account: &AccountKey,
) -> Result<(), LedgerError> {
    store.delete(account)?;
    Ok(())
}

/// Raw stored balance of `account`.
pub fn query<S: AccountStore + ?Sized>(
    store: &S,
    account: &AccountKey,
) -> Result<Vec<u8>, LedgerError> {
    store
        .get(account)?
        .ok_or_else(|| LedgerError::AccountAbnormal(account.clone()))
}

/// Move `amount` from `from` to `to`.
///
/// On stores with atomic batches both legs commit together. Otherwise the
/// debit is written first; if the credit then fails the debit is reverted
/// and [`LedgerError::CreditReverted`] is returned, or
/// [`LedgerError::CompensationFailed`] if the revert fails as well.
pub fn transfer<S: AccountStore + ?Sized>(
    store: &S,
    from: &AccountKey,
    to: &AccountKey,
    amount: Balance,
) -> Result<(), LedgerError> {
    let from_raw = store.get(from)?;
    let to_raw = store.get(to)?;
    let (from_raw, to_raw) = match (from_raw, to_raw) {
        (Some(f), Some(t)) => (f, t),
        (None, _) => return Err(LedgerError::AccountAbnormal(from.clone())),
        (_, None) => return Err(LedgerError::AccountAbnormal(to.clone())),
    };
    let from_balance = decode_balance(from, &from_raw)?;
    let to_balance = decode_balance(to, &to_raw)?;

    let debited = from_balance
        .checked_sub(amount)
        .ok_or_else(|| LedgerError::InsufficientFunds {
            account: from.clone(),
            balance: from_balance,
            amount,
        })?;

    // Debiting and crediting the same key would read the balance twice.
    if from == to {
        tracing::debug!(account = %from, %amount, "self-transfer, nothing to write");
        return Ok(());
    }

    let credited = to_balance
        .checked_add(amount)
        .ok_or_else(|| LedgerError::BalanceOverflow {
            account: to.clone(),
            amount,
        })?;

    if store.supports_atomic_batch() {
        store.put_all(&[
            (from.clone(), debited.encode()),
            (to.clone(), credited.encode()),
        ])?;
        return Ok(());
    }

    store.put(from, &debited.encode())?;
    if let Err(original) = store.put(to, &credited.encode()) {
        return Err(compensate(store, from, to, from_balance, original));
    }
    Ok(())
}

fn compensate<S: AccountStore + ?Sized>(
    store: &S,
    from: &AccountKey,
    to: &AccountKey,
    from_balance: Balance,
    original: StoreError,
) -> LedgerError {
    match store.put(from, &from_balance.encode()) {
        Ok(()) => {
            tracing::warn!(
                debited = %from,
                credited = %to,
                error = %original,
                "credit failed, debit reverted"
            );
            LedgerError::CreditReverted {
                debited: from.clone(),
                credited: to.clone(),
                source: original,
            }
        }
        Err(compensation) => {
            tracing::error!(
                debited = %from,
                credited = %to,
                balance = %from_balance,
                error = %original,
                compensation_error = %compensation,
                "credit failed and debit could not be reverted, reconciliation required"
            );
            LedgerError::CompensationFailed {
                debited: from.clone(),
                credited: to.clone(),
                original,
                compensation,
            }
        }
    }
}

fn decode_balance(account: &AccountKey, raw: &[u8]) -> Result<Balance, LedgerError> {
    Balance::decode(raw).map_err(|source| LedgerError::CorruptBalance {
        account: account.clone(),
        source,
    })
}

/// Check that every read key exists, then store `sentinel` under every write
/// key. Nothing is written unless all reads succeed.
pub fn read_write<S: AccountStore + ?Sized>(
    store: &S,
    reads: &[AccountKey],
    writes: &[AccountKey],
    sentinel: &[u8],
) -> Result<(), LedgerError> {
    for key in reads {
        if store.get(key)?.is_none() {
            return Err(LedgerError::AccountAbnormal(key.clone()));
        }
    }
    if writes.is_empty() {
        return Ok(());
    }
    let entries: Vec<(AccountKey, Vec<u8>)> = writes
        .iter()
        .map(|key| (key.clone(), sentinel.to_vec()))
        .collect();
    store.put_all(&entries)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_nullables::NullStore;

    fn key(s: &str) -> AccountKey {
        AccountKey::new(s)
    }

    fn balance_of(store: &NullStore, account: &str) -> Balance {
        Balance::decode(&store.get(&key(account)).unwrap().unwrap()).unwrap()
    }

    fn funded(accounts: &[(&str, u64)]) -> NullStore {
        NullStore::with_entries(
            accounts
                .iter()
                .map(|(k, v)| (AccountKey::new(*k), Balance::new(*v).encode())),
        )
    }

    #[test]
    fn init_creates_sequential_accounts() {
        let store = NullStore::new();
        init(&store, &LedgerConfig::default(), 3, Balance::new(100)).unwrap();
        assert_eq!(store.len(), 3);
        for name in ["acc0", "acc1", "acc2"] {
            assert_eq!(balance_of(&store, name), Balance::new(100));
        }
    }

    #[test]
    fn init_overwrites_existing_values() {
        let store = funded(&[("acc0", 5)]);
        init(&store, &LedgerConfig::default(), 1, Balance::new(100)).unwrap();
        assert_eq!(balance_of(&store, "acc0"), Balance::new(100));
    }

    #[test]
    fn init_zero_accounts_writes_nothing() {
        let store = NullStore::new();
        init(&store, &LedgerConfig::default(), 0, Balance::new(100)).unwrap();
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn init_retries_transient_faults() {
        let store = NullStore::new();
        store.fail_puts(&key("acc1"), 2);
        init(&store, &LedgerConfig::default(), 3, Balance::new(7)).unwrap();
        assert_eq!(balance_of(&store, "acc1"), Balance::new(7));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn init_gives_up_on_persistent_fault() {
        let store = NullStore::new();
        store.fail_puts_always(&key("acc1"));
        let err = init(&store, &LedgerConfig::default(), 3, Balance::new(7)).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(StoreError::Injected(_))));
        assert!(store.exists(&key("acc0")).unwrap());
        assert!(!store.exists(&key("acc2")).unwrap());
    }

    #[test]
    fn init_honours_prefix() {
        let store = NullStore::new();
        let config = LedgerConfig {
            account_prefix: "user".to_string(),
            ..LedgerConfig::default()
        };
        init(&store, &config, 2, Balance::new(1)).unwrap();
        assert!(store.exists(&key("user0")).unwrap());
        assert!(store.exists(&key("user1")).unwrap());
    }

    #[test]
    fn open_rejects_existing_account() {
        let store = NullStore::new();
        open(&store, &key("newacct"), Balance::new(50)).unwrap();
        let err = open(&store, &key("newacct"), Balance::new(10)).unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyExists(_)));
        assert_eq!(balance_of(&store, "newacct"), Balance::new(50));
    }

    #[test]
    fn open_treats_any_stored_value_as_existing() {
        let store = NullStore::with_entries([("w", "not-a-number")]);
        assert!(matches!(
            open(&store, &key("w"), Balance::new(1)),
            Err(LedgerError::AlreadyExists(_))
        ));
    }

    #[test]
    fn delete_is_idempotent() {
        let store = funded(&[("a", 1)]);
        delete(&store, &key("a")).unwrap();
        delete(&store, &key("a")).unwrap();
        assert!(matches!(
            query(&store, &key("a")),
            Err(LedgerError::AccountAbnormal(_))
        ));
    }

    #[test]
    fn query_returns_raw_bytes() {
        let store = NullStore::with_entries([("a", "60")]);
        assert_eq!(query(&store, &key("a")).unwrap(), b"60".to_vec());
    }

    #[test]
    fn transfer_moves_funds() {
        let store = funded(&[("acc0", 100), ("acc1", 100)]);
        transfer(&store, &key("acc0"), &key("acc1"), Balance::new(40)).unwrap();
        assert_eq!(balance_of(&store, "acc0"), Balance::new(60));
        assert_eq!(balance_of(&store, "acc1"), Balance::new(140));
    }

    #[test]
    fn transfer_uses_each_accounts_own_balance() {
        let store = funded(&[("rich", 1000), ("poor", 3)]);
        transfer(&store, &key("rich"), &key("poor"), Balance::new(10)).unwrap();
        assert_eq!(balance_of(&store, "rich"), Balance::new(990));
        assert_eq!(balance_of(&store, "poor"), Balance::new(13));
    }

    #[test]
    fn transfer_insufficient_funds_changes_nothing() {
        let store = funded(&[("acc0", 60), ("acc1", 140)]);
        let err = transfer(&store, &key("acc0"), &key("acc1"), Balance::new(1000)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(store.write_count(), 0);
        assert_eq!(balance_of(&store, "acc0"), Balance::new(60));
    }

    #[test]
    fn transfer_entire_balance() {
        let store = funded(&[("a", 25), ("b", 0)]);
        transfer(&store, &key("a"), &key("b"), Balance::new(25)).unwrap();
        assert_eq!(balance_of(&store, "a"), Balance::ZERO);
        assert_eq!(balance_of(&store, "b"), Balance::new(25));
    }

    #[test]
    fn transfer_requires_both_accounts() {
        let store = funded(&[("a", 10)]);
        assert!(matches!(
            transfer(&store, &key("a"), &key("missing"), Balance::new(1)),
            Err(LedgerError::AccountAbnormal(k)) if k == key("missing")
        ));
        assert!(matches!(
            transfer(&store, &key("missing"), &key("a"), Balance::new(1)),
            Err(LedgerError::AccountAbnormal(k)) if k == key("missing")
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn self_transfer_is_a_noop() {
        let store = funded(&[("a", 10)]);
        transfer(&store, &key("a"), &key("a"), Balance::new(4)).unwrap();
        assert_eq!(balance_of(&store, "a"), Balance::new(10));
        assert_eq!(store.write_count(), 0);
        assert!(matches!(
            transfer(&store, &key("a"), &key("a"), Balance::new(11)),
            Err(LedgerError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn transfer_rejects_corrupt_balance() {
        let store = NullStore::with_entries([("a", "10"), ("b", "ten")]);
        assert!(matches!(
            transfer(&store, &key("a"), &key("b"), Balance::new(1)),
            Err(LedgerError::CorruptBalance { account, .. }) if account == key("b")
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn transfer_rejects_overflowing_credit() {
        let store = funded(&[("a", 10), ("b", u64::MAX)]);
        assert!(matches!(
            transfer(&store, &key("a"), &key("b"), Balance::new(1)),
            Err(LedgerError::BalanceOverflow { .. })
        ));
        assert_eq!(balance_of(&store, "a"), Balance::new(10));
    }

    #[test]
    fn transfer_debit_fault_writes_nothing() {
        let store = funded(&[("a", 10), ("b", 0)]);
        store.fail_puts(&key("a"), 1);
        assert!(matches!(
            transfer(&store, &key("a"), &key("b"), Balance::new(5)),
            Err(LedgerError::Storage(_))
        ));
        assert_eq!(balance_of(&store, "a"), Balance::new(10));
        assert_eq!(balance_of(&store, "b"), Balance::ZERO);
    }

    #[test]
    fn transfer_credit_fault_reverts_debit() {
        let store = funded(&[("a", 10), ("b", 0)]);
        store.fail_puts(&key("b"), 1);
        let err = transfer(&store, &key("a"), &key("b"), Balance::new(5)).unwrap_err();
        assert!(matches!(err, LedgerError::CreditReverted { .. }));
        assert!(!err.is_fatal());
        assert_eq!(err.code().as_u16(), 300);
        assert_eq!(balance_of(&store, "a"), Balance::new(10));
        assert_eq!(balance_of(&store, "b"), Balance::ZERO);
    }

    #[test]
    fn transfer_double_fault_is_fatal() {
        let store = funded(&[("a", 10), ("b", 0)]);
        store.fail_puts(&key("b"), 1);
        store.fail_puts_after(&key("a"), 1, 1);
        let err = transfer(&store, &key("a"), &key("b"), Balance::new(5)).unwrap_err();
        assert!(err.is_fatal());
        match err {
            LedgerError::CompensationFailed {
                debited,
                credited,
                original,
                compensation,
            } => {
                assert_eq!(debited, key("a"));
                assert_eq!(credited, key("b"));
                assert_eq!(original, StoreError::Injected("put b".to_string()));
                assert_eq!(compensation, StoreError::Injected("put a".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
        // The debit stuck; only reconciliation can fix it.
        assert_eq!(balance_of(&store, "a"), Balance::new(5));
    }

    #[test]
    fn read_write_sets_sentinel() {
        let store = funded(&[("acc1", 1), ("acc2", 2)]);
        read_write(
            &store,
            &[key("acc1"), key("acc2")],
            &[key("acc2"), key("acc9")],
            b"100",
        )
        .unwrap();
        assert_eq!(store.get(&key("acc2")).unwrap(), Some(b"100".to_vec()));
        assert_eq!(store.get(&key("acc9")).unwrap(), Some(b"100".to_vec()));
        assert_eq!(balance_of(&store, "acc1"), Balance::new(1));
    }

    #[test]
    fn read_write_missing_read_writes_nothing() {
        let store = funded(&[("acc1", 1)]);
        let err = read_write(&store, &[key("acc1"), key("ghost")], &[key("acc1")], b"100")
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountAbnormal(k) if k == key("ghost")));
        assert_eq!(store.write_count(), 0);
        assert_eq!(balance_of(&store, "acc1"), Balance::new(1));
    }

    #[test]
    fn read_write_read_fault_writes_nothing() {
        let store = funded(&[("acc1", 1)]);
        store.fail_gets(&key("acc1"));
        assert!(matches!(
            read_write(&store, &[key("acc1")], &[key("acc2")], b"100"),
            Err(LedgerError::Storage(_))
        ));
        assert_eq!(store.write_count(), 0);
    }
}
