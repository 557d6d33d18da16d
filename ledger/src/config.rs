//! Ledger configuration, loadable from the `[ledger]` table of a TOML file.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Prefix for accounts created by `init`: `acc0`, `acc1`, ...
    #[serde(default = "default_account_prefix")]
    pub account_prefix: String,

    /// Attempts per account before `init` gives up on a failing put.
    #[serde(default = "default_init_put_attempts")]
    pub init_put_attempts: u32,

    /// Value stored under every write key of a `readwrite` batch.
    #[serde(default = "default_write_sentinel")]
    pub write_sentinel: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            account_prefix: default_account_prefix(),
            init_put_attempts: default_init_put_attempts(),
            write_sentinel: default_write_sentinel(),
        }
    }
}

fn default_account_prefix() -> String {
    "acc".to_string()
}

fn default_init_put_attempts() -> u32 {
    3
}

fn default_write_sentinel() -> String {
    "100".to_string()
}
