use serde::{Deserialize, Serialize};
use thiserror::Error;

use tally_store::StoreError;
use tally_types::{AccountKey, Balance, TypesError};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("malformed argument: {0}")]
    MalformedArgument(String),

    #[error("account already exists: {0}")]
    AlreadyExists(AccountKey),

    #[error("account missing or abnormal: {0}")]
    AccountAbnormal(AccountKey),

    #[error("insufficient funds in {account}: balance {balance}, requested {amount}")]
    InsufficientFunds {
        account: AccountKey,
        balance: Balance,
        amount: Balance,
    },

    #[error("stored balance of {account} is corrupt: {source}")]
    CorruptBalance {
        account: AccountKey,
        source: TypesError,
    },

    #[error("crediting {amount} to {account} would overflow its balance")]
    BalanceOverflow { account: AccountKey, amount: Balance },

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// The credit leg failed after the debit was written; the debit was
    /// rolled back.
    #[error("credit of {credited} failed and debit of {debited} was reverted: {source}")]
    CreditReverted {
        debited: AccountKey,
        credited: AccountKey,
        source: StoreError,
    },

    /// The credit leg failed and rolling back the debit failed too. The
    /// balance of `debited` is not trustworthy until reconciled.
    #[error(
        "credit of {credited} failed ({original}) and restoring {debited} failed ({compensation})"
    )]
    CompensationFailed {
        debited: AccountKey,
        credited: AccountKey,
        original: StoreError,
        compensation: StoreError,
    },
}

/// Numeric failure codes reported at the invocation boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    System = 300,
    WrongFormat = 301,
    AccountExisting = 302,
    AccountAbnormal = 303,
    MoneyNotEnough = 304,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl LedgerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LedgerError::MalformedArgument(_) => ErrorCode::WrongFormat,
            LedgerError::AlreadyExists(_) => ErrorCode::AccountExisting,
            LedgerError::AccountAbnormal(_) => ErrorCode::AccountAbnormal,
            LedgerError::InsufficientFunds { .. } => ErrorCode::MoneyNotEnough,
            LedgerError::CorruptBalance { .. }
            | LedgerError::BalanceOverflow { .. }
            | LedgerError::Storage(_)
            | LedgerError::CreditReverted { .. }
            | LedgerError::CompensationFailed { .. } => ErrorCode::System,
        }
    }

    /// Whether the ledger may now be inconsistent and needs external
    /// reconciliation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LedgerError::CompensationFailed { .. })
    }

    /// Human-readable reason reported alongside the code.
    pub fn reason(&self) -> String {
        match self {
            LedgerError::MalformedArgument(_) => "command format is wrong".to_string(),
            LedgerError::AlreadyExists(_) => "account already exists".to_string(),
            LedgerError::AccountAbnormal(_) => "abnormal account".to_string(),
            LedgerError::InsufficientFunds { .. } => "account's money is not enough".to_string(),
            LedgerError::Storage(e) | LedgerError::CreditReverted { source: e, .. } => {
                format!("system error: {e}")
            }
            other => format!("system error: {other}"),
        }
    }
}

/// Structured failure as seen by the caller: `{"code": 303, "reason": "abnormal account"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub code: u16,
    pub reason: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fatal: bool,
}

impl From<&LedgerError> for Failure {
    fn from(e: &LedgerError) -> Self {
        Self {
            code: e.code().as_u16(),
            reason: e.reason(),
            fatal: e.is_fatal(),
        }
    }
}

impl Failure {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"reason":"unencodable failure"}}"#, self.code)
        })
    }
}
