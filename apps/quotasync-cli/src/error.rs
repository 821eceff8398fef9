//! CLI error types and exit codes
//!
//! These cover only failures to start a run at all. Once reconciliation
//! is underway, per-source failures land in the report and the exit code
//! is derived from it in `main`.

use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid connection settings for '{database}': {message}")]
    Config { database: String, message: String },

    #[error("Cannot reach the ledger database '{database}': {message}")]
    LedgerConnect { database: String, message: String },
}

impl CliError {
    /// Startup failures all map to exit code 1; non-zero codes for a run
    /// that did start come from the sync report instead.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
