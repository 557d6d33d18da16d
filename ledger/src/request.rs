//! Typed requests and their parsing from `function` + string arguments.

use std::fmt;
use std::str::FromStr;

use tally_types::{AccountKey, Balance};

use crate::LedgerError;

/// The operations the ledger understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Init,
    Open,
    Delete,
    Query,
    Transfer,
    ReadWrite,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Init,
        Operation::Open,
        Operation::Delete,
        Operation::Query,
        Operation::Transfer,
        Operation::ReadWrite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Open => "open",
            Operation::Delete => "delete",
            Operation::Query => "query",
            Operation::Transfer => "transfer",
            Operation::ReadWrite => "readwrite",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| LedgerError::MalformedArgument(format!("unknown operation {s:?}")))
    }
}

/// A validated ledger request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Init {
        account_count: u64,
        initial_balance: Balance,
    },
    Open {
        account: AccountKey,
        initial_balance: Balance,
    },
    Delete {
        account: AccountKey,
    },
    Query {
        account: AccountKey,
    },
    Transfer {
        from: AccountKey,
        to: AccountKey,
        amount: Balance,
    },
    ReadWrite {
        reads: Vec<AccountKey>,
        writes: Vec<AccountKey>,
    },
}

impl Request {
    /// Parse `function` and its positional arguments.
    ///
    /// `readwrite` takes `readCount r1..rN writeCount w1..wM` and the list
    /// must be exactly as long as the counts say.
    pub fn parse<A: AsRef<str>>(function: &str, args: &[A]) -> Result<Self, LedgerError> {
        let operation: Operation = function.parse()?;
        let request = match operation {
            Operation::Init => {
                let [count, balance] = exact::<2, _>(operation, args)?;
                Request::Init {
                    account_count: parse_count(count)?,
                    initial_balance: parse_balance(balance)?,
                }
            }
            Operation::Open => {
                let [account, balance] = exact::<2, _>(operation, args)?;
                Request::Open {
                    account: AccountKey::new(account),
                    initial_balance: parse_balance(balance)?,
                }
            }
            Operation::Delete => {
                let [account] = exact::<1, _>(operation, args)?;
                Request::Delete {
                    account: AccountKey::new(account),
                }
            }
            Operation::Query => {
                let [account] = exact::<1, _>(operation, args)?;
                Request::Query {
                    account: AccountKey::new(account),
                }
            }
            Operation::Transfer => {
                let [from, to, amount] = exact::<3, _>(operation, args)?;
                Request::Transfer {
                    from: AccountKey::new(from),
                    to: AccountKey::new(to),
                    amount: parse_balance(amount)?,
                }
            }
            Operation::ReadWrite => {
                let (reads, rest) = take_counted(args)?;
                let (writes, rest) = take_counted(rest)?;
                if !rest.is_empty() {
                    return Err(LedgerError::MalformedArgument(format!(
                        "{} trailing arguments after write keys",
                        rest.len()
                    )));
                }
                Request::ReadWrite { reads, writes }
            }
        };
        Ok(request)
    }

    pub fn operation(&self) -> Operation {
        match self {
            Request::Init { .. } => Operation::Init,
            Request::Open { .. } => Operation::Open,
            Request::Delete { .. } => Operation::Delete,
            Request::Query { .. } => Operation::Query,
            Request::Transfer { .. } => Operation::Transfer,
            Request::ReadWrite { .. } => Operation::ReadWrite,
        }
    }
}

fn exact<'a, const N: usize, A: AsRef<str>>(
    operation: Operation,
    args: &'a [A],
) -> Result<[&'a str; N], LedgerError> {
    if args.len() != N {
        return Err(LedgerError::MalformedArgument(format!(
            "{operation} takes {N} arguments, got {}",
            args.len()
        )));
    }
    Ok(std::array::from_fn(|i| args[i].as_ref()))
}

fn parse_count(s: &str) -> Result<u64, LedgerError> {
    s.parse()
        .map_err(|_| LedgerError::MalformedArgument(format!("invalid count {s:?}")))
}

fn parse_balance(s: &str) -> Result<Balance, LedgerError> {
    Balance::parse(s).map_err(|e| LedgerError::MalformedArgument(e.to_string()))
}

/// Split `count k1..kcount` off the front of `args`.
fn take_counted<A: AsRef<str>>(args: &[A]) -> Result<(Vec<AccountKey>, &[A]), LedgerError> {
    let (count, rest) = args
        .split_first()
        .ok_or_else(|| LedgerError::MalformedArgument("missing key count".to_string()))?;
    let count = usize::try_from(parse_count(count.as_ref())?)
        .map_err(|_| LedgerError::MalformedArgument("key count too large".to_string()))?;
    if rest.len() < count {
        return Err(LedgerError::MalformedArgument(format!(
            "expected {count} keys, got {}",
            rest.len()
        )));
    }
    let (keys, rest) = rest.split_at(count);
    let keys = keys.iter().map(|k| AccountKey::new(k.as_ref())).collect();
    Ok((keys, rest))
}
