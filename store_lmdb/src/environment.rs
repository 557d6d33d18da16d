//! LMDB environment setup.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::account::LmdbAccountStore;
use crate::LmdbError;

/// Default map size: 1 GiB.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

const MAX_DBS: u32 = 1;
const ACCOUNTS_DB: &str = "accounts";

/// Wraps the LMDB environment and the accounts database handle.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    accounts_db: Database<Bytes, Bytes>,
    path: PathBuf,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at `path`, creating the directory
    /// if needed.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        fs::create_dir_all(path)?;

        let mut options = EnvOpenOptions::new();
        options.map_size(map_size).max_dbs(MAX_DBS);
        // SAFETY: the environment is opened once per process per path and
        // the files are not modified by anything but this environment.
        let env = unsafe { options.open(path)? };

        let mut wtxn = env.write_txn()?;
        let accounts_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some(ACCOUNTS_DB))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            accounts_db,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Handle onto the accounts database. Handles share the environment.
    pub fn account_store(&self) -> LmdbAccountStore {
        LmdbAccountStore {
            env: Arc::clone(&self.env),
            accounts_db: self.accounts_db,
        }
    }
}
