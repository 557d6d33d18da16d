//! The ledger over the LMDB backend, where transfers commit atomically.

use tally_ledger::{Ledger, LedgerConfig, Response};
use tally_store::AccountStore;
use tally_store_lmdb::environment::DEFAULT_MAP_SIZE;
use tally_store_lmdb::{LmdbAccountStore, LmdbEnvironment};
use tally_types::AccountKey;

fn open_ledger(dir: &std::path::Path) -> Ledger<LmdbAccountStore> {
    let env = LmdbEnvironment::open(dir, DEFAULT_MAP_SIZE).unwrap();
    Ledger::new(env.account_store(), LedgerConfig::default())
}

fn query(ledger: &Ledger<LmdbAccountStore>, account: &str) -> Vec<u8> {
    ledger.query(&AccountKey::new(account)).unwrap()
}

#[test]
fn scenario_on_lmdb() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = open_ledger(dir.path());
    assert!(ledger.store().supports_atomic_batch());

    assert!(ledger.invoke("init", &["3", "100"]).is_success());
    assert!(ledger.invoke("transfer", &["acc0", "acc1", "40"]).is_success());
    assert_eq!(query(&ledger, "acc0"), b"60");
    assert_eq!(query(&ledger, "acc1"), b"140");
    assert_eq!(query(&ledger, "acc2"), b"100");

    match ledger.invoke("transfer", &["acc0", "acc1", "1000"]) {
        Response::Failure(f) => assert_eq!(f.code, 304),
        Response::Success(_) => panic!("overdraft accepted"),
    }
    assert_eq!(query(&ledger, "acc0"), b"60");
}

#[test]
fn state_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let ledger = open_ledger(dir.path());
        assert!(ledger.invoke("open", &["newacct", "50"]).is_success());
        assert!(ledger.invoke("readwrite", &["1", "newacct", "1", "hot"]).is_success());
    }
    let ledger = open_ledger(dir.path());
    assert_eq!(query(&ledger, "newacct"), b"50");
    assert_eq!(query(&ledger, "hot"), b"100");
    assert_eq!(ledger.store().len().unwrap(), 2);

    match ledger.invoke("open", &["newacct", "10"]) {
        Response::Failure(f) => assert_eq!(f.code, 302),
        Response::Success(_) => panic!("reopened existing account"),
    }
}

#[test]
fn delete_then_query_on_lmdb() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = open_ledger(dir.path());
    assert!(ledger.invoke("open", &["gone", "5"]).is_success());
    assert!(ledger.invoke("delete", &["gone"]).is_success());
    assert!(ledger.invoke("delete", &["gone"]).is_success());
    match ledger.invoke("query", &["gone"]) {
        Response::Failure(f) => assert_eq!(f.code, 303),
        Response::Success(_) => panic!("deleted account still present"),
    }
}
