//! The ledger façade: dispatches requests to operations over an injected
//! store, records footprints and keeps invocation statistics.

use std::collections::BTreeMap;

use tally_store::AccountStore;
use tally_types::{AccountKey, Balance};
use tally_utils::StatsCounter;

use crate::footprint::{Footprint, TrackingStore};
use crate::operations;
use crate::request::{Operation, Request};
use crate::{Failure, LedgerConfig, LedgerError};

const FAILED: &str = "failed";
const COMPENSATED: &str = "compensated";
const FATAL: &str = "fatal";

/// Result of a successful operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Bytes returned to the caller; only `query` returns any.
    pub payload: Option<Vec<u8>>,
    pub footprint: Footprint,
}

/// What the invocation boundary hands back to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Success(Outcome),
    Failure(Failure),
}

impl Response {
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Response::Failure(f) if f.fatal)
    }
}

pub struct Ledger<S> {
    store: S,
    config: LedgerConfig,
    stats: StatsCounter,
}

impl<S: AccountStore> Ledger<S> {
    pub fn new(store: S, config: LedgerConfig) -> Self {
        let mut names: Vec<&'static str> = Operation::ALL.iter().map(|op| op.as_str()).collect();
        names.extend([FAILED, COMPENSATED, FATAL]);
        Self {
            store,
            config,
            stats: StatsCounter::new(&names),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Invocation counts per operation plus failure, compensation and fatal
    /// counts.
    pub fn stats(&self) -> BTreeMap<&'static str, u64> {
        self.stats.snapshot()
    }

    /// Parse and execute one request from the invocation boundary.
    pub fn invoke<A: AsRef<str>>(&self, function: &str, args: &[A]) -> Response {
        let request = match Request::parse(function, args) {
            Ok(request) => request,
            Err(e) => {
                self.record_failure(&e);
                return Response::Failure(Failure::from(&e));
            }
        };
        match self.execute(&request) {
            Ok(outcome) => Response::Success(outcome),
            Err(e) => Response::Failure(Failure::from(&e)),
        }
    }

    pub fn execute(&self, request: &Request) -> Result<Outcome, LedgerError> {
        self.stats.increment(request.operation().as_str());
        let tracked = TrackingStore::new(&self.store);
        let result = match request {
            Request::Init {
                account_count,
                initial_balance,
            } => operations::init(&tracked, &self.config, *account_count, *initial_balance)
                .map(|()| None),
            Request::Open {
                account,
                initial_balance,
            } => operations::open(&tracked, account, *initial_balance).map(|()| None),
            Request::Delete { account } => operations::delete(&tracked, account).map(|()| None),
            Request::Query { account } => operations::query(&tracked, account).map(Some),
            Request::Transfer { from, to, amount } => {
                operations::transfer(&tracked, from, to, *amount).map(|()| None)
            }
            Request::ReadWrite { reads, writes } => operations::read_write(
                &tracked,
                reads,
                writes,
                self.config.write_sentinel.as_bytes(),
            )
            .map(|()| None),
        };
        match result {
            Ok(payload) => Ok(Outcome {
                payload,
                footprint: tracked.into_footprint(),
            }),
            Err(e) => {
                self.record_failure(&e);
                tracing::debug!(operation = %request.operation(), error = %e, "operation failed");
                Err(e)
            }
        }
    }

    pub fn init(
        &self,
        account_count: u64,
        initial_balance: Balance,
    ) -> Result<Outcome, LedgerError> {
        self.execute(&Request::Init {
            account_count,
            initial_balance,
        })
    }

    pub fn open(
        &self,
        account: &AccountKey,
        initial_balance: Balance,
    ) -> Result<Outcome, LedgerError> {
        self.execute(&Request::Open {
            account: account.clone(),
            initial_balance,
        })
    }

    pub fn delete(&self, account: &AccountKey) -> Result<Outcome, LedgerError> {
        self.execute(&Request::Delete {
            account: account.clone(),
        })
    }

    /// Raw stored balance of `account`.
    pub fn query(&self, account: &AccountKey) -> Result<Vec<u8>, LedgerError> {
        let outcome = self.execute(&Request::Query {
            account: account.clone(),
        })?;
        Ok(outcome.payload.unwrap_or_default())
    }

    pub fn transfer(
        &self,
        from: &AccountKey,
        to: &AccountKey,
        amount: Balance,
    ) -> Result<Outcome, LedgerError> {
        self.execute(&Request::Transfer {
            from: from.clone(),
            to: to.clone(),
            amount,
        })
    }

    pub fn read_write(
        &self,
        reads: &[AccountKey],
        writes: &[AccountKey],
    ) -> Result<Outcome, LedgerError> {
        self.execute(&Request::ReadWrite {
            reads: reads.to_vec(),
            writes: writes.to_vec(),
        })
    }

    fn record_failure(&self, e: &LedgerError) {
        self.stats.increment(FAILED);
        match e {
            LedgerError::CreditReverted { .. } => self.stats.increment(COMPENSATED),
            LedgerError::CompensationFailed { .. } => self.stats.increment(FATAL),
            _ => {}
        }
    }
}
