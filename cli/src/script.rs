//! Feeding requests to the ledger and printing one JSON line per response.

use std::io::{BufRead, Write};

use serde_json::{json, Value};

use tally_ledger::{Ledger, Response};
use tally_store::AccountStore;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub requests: u64,
    pub failures: u64,
    /// Set when a request hit a fatal fault; the run stops there.
    pub fatal: bool,
}

/// JSON rendering of one response.
pub fn render(function: &str, response: &Response) -> Value {
    match response {
        Response::Success(outcome) => json!({
            "function": function,
            "status": "ok",
            "payload": outcome
                .payload
                .as_deref()
                .map(|p| String::from_utf8_lossy(p).into_owned()),
            "reads": outcome.footprint.reads,
            "writes": outcome.footprint.writes,
        }),
        Response::Failure(failure) => json!({
            "function": function,
            "status": "error",
            "code": failure.code,
            "reason": failure.reason,
            "fatal": failure.fatal,
        }),
    }
}

/// Run a single request and print its response.
pub fn run_one<S, W>(
    ledger: &Ledger<S>,
    function: &str,
    args: &[String],
    out: &mut W,
) -> anyhow::Result<Response>
where
    S: AccountStore,
    W: Write,
{
    let response = ledger.invoke(function, args);
    writeln!(out, "{}", render(function, &response))?;
    Ok(response)
}

/// Run every request in `input`, one per line as `function arg arg ...`.
///
/// Blank lines and lines starting with `#` are skipped. Processing stops
/// after the first fatal failure.
pub fn run_script<S, R, W>(
    ledger: &Ledger<S>,
    input: R,
    out: &mut W,
) -> anyhow::Result<ScriptSummary>
where
    S: AccountStore,
    R: BufRead,
    W: Write,
{
    let mut summary = ScriptSummary::default();
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(function) = words.next() else {
            continue;
        };
        if function.starts_with('#') {
            continue;
        }
        let args: Vec<String> = words.map(str::to_string).collect();

        let response = run_one(ledger, function, &args, out)?;
        summary.requests += 1;
        if !response.is_success() {
            summary.failures += 1;
        }
        if response.is_fatal() {
            tracing::error!(line = index + 1, function, "fatal ledger fault, stopping script");
            summary.fatal = true;
            break;
        }
    }
    Ok(summary)
}
