//! tally: command-line harness for the account ledger.

mod config;
mod script;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use crate::config::CliConfig;
use tally_ledger::Ledger;
use tally_nullables::NullStore;
use tally_store::AccountStore;
use tally_store_lmdb::LmdbEnvironment;

#[derive(Parser)]
#[command(name = "tally", about = "Account ledger command-line harness")]
struct Cli {
    /// Directory holding the LMDB environment.
    #[arg(long, env = "TALLY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Use a throwaway in-memory store instead of LMDB.
    #[arg(long, env = "TALLY_IN_MEMORY")]
    in_memory: bool,

    /// LMDB map size in MiB.
    #[arg(long, env = "TALLY_MAP_SIZE_MB")]
    map_size_mb: Option<usize>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TALLY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, env = "TALLY_LOG_JSON")]
    log_json: bool,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a single operation, e.g. `tally invoke transfer acc0 acc1 40`.
    Invoke {
        /// One of init, open, delete, query, transfer, readwrite.
        function: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run one operation per line from a file, or from stdin when omitted.
    Script { file: Option<PathBuf> },
}

fn resolve_config(cli: &Cli) -> anyhow::Result<CliConfig> {
    let base = match cli.config {
        Some(ref path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    Ok(CliConfig {
        data_dir: cli.data_dir.clone().unwrap_or(base.data_dir),
        map_size_mb: cli.map_size_mb.unwrap_or(base.map_size_mb),
        in_memory: cli.in_memory || base.in_memory,
        log_level: cli.log_level.clone().unwrap_or(base.log_level),
        log_json: cli.log_json || base.log_json,
        ledger: base.ledger,
    })
}

fn open_store(config: &CliConfig) -> anyhow::Result<Box<dyn AccountStore>> {
    if config.in_memory {
        tracing::info!("using in-memory store");
        return Ok(Box::new(NullStore::new()));
    }
    let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())?;
    tracing::info!(path = %env.path().display(), "opened LMDB store");
    Ok(Box::new(env.account_store()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    tally_utils::init_tracing(&config.log_level, config.log_json);

    let store = open_store(&config)?;
    let ledger = Ledger::new(store, config.ledger.clone());
    let mut out = io::stdout().lock();

    let started = Instant::now();
    let fatal = match cli.command {
        Command::Invoke { function, args } => {
            script::run_one(&ledger, &function, &args, &mut out)?.is_fatal()
        }
        Command::Script { file } => {
            let input: Box<dyn BufRead> = match file {
                Some(path) => Box::new(BufReader::new(File::open(path)?)),
                None => Box::new(io::stdin().lock()),
            };
            let summary = script::run_script(&ledger, input, &mut out)?;
            tracing::info!(
                requests = summary.requests,
                failures = summary.failures,
                "processed script in {}",
                tally_utils::format_duration(started.elapsed())
            );
            summary.fatal
        }
    };
    tracing::debug!(stats = ?ledger.stats(), "ledger statistics");

    if fatal {
        anyhow::bail!("ledger state may be inconsistent, external reconciliation required");
    }
    Ok(())
}
