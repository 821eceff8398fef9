//! quotasync - reconcile quota usage accounting against actual usage
//!
//! Loads the shared reported-usage ledger, computes ground-truth counts
//! from each service database, and corrects drifted ledger rows under
//! optimistic concurrency. Exit codes:
//! - 0: the run completed (individual corrections may still have been
//!   stale or failed; see the logged summary)
//! - 1: the run could not start (bad settings, ledger unreachable)
//! - 2: the run completed but at least one source was unreachable

use clap::Parser;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use quotasync_core::SyncOrchestrator;
use quotasync_db::{BlockStorageSource, ComputeSource, QuotaLedger};

mod config;
mod error;
mod logging;

use config::DbCredentials;
use error::{CliError, CliResult};

/// Reconcile quota usage records against actual resource usage
#[derive(Parser)]
#[command(name = "quotasync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// MySQL server hostname
    #[arg(long, default_value = "localhost")]
    host: String,

    /// MySQL server port
    #[arg(long, default_value_t = 3306)]
    port: u16,

    /// MySQL user
    #[arg(short = 'u', long, default_value = "root")]
    user: String,

    /// MySQL password
    #[arg(short = 'p', long)]
    password: Option<String>,

    /// Database holding the quota_usages ledger
    #[arg(long, default_value = "nova")]
    ledger_db: String,

    /// Block-storage service database
    #[arg(long, default_value = "cinder")]
    block_storage_db: String,

    /// Compute service database
    #[arg(long, default_value = "nova")]
    compute_db: String,

    /// Compute and log corrections without writing any of them
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!(error = %e, "quotasync failed to start");
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<i32> {
    let creds = DbCredentials {
        host: cli.host,
        port: cli.port,
        user: cli.user,
        password: cli.password,
    };

    // The ledger connection is verified up front: without it no pass can
    // do anything. Source pools connect lazily so a dead service
    // database surfaces as a per-pass failure instead.
    let ledger_pool = MySqlPoolOptions::new()
        .max_connections(2)
        .connect(&creds.url(&cli.ledger_db))
        .await
        .map_err(|e| CliError::LedgerConnect {
            database: cli.ledger_db.clone(),
            message: e.to_string(),
        })?;

    let block_storage_pool = lazy_pool(&creds, &cli.block_storage_db)?;
    let compute_pool = lazy_pool(&creds, &cli.compute_db)?;

    let mut orchestrator =
        SyncOrchestrator::new(QuotaLedger::new(ledger_pool)).with_dry_run(cli.dry_run);
    orchestrator.register(Box::new(BlockStorageSource::new(block_storage_pool)));
    orchestrator.register(Box::new(ComputeSource::new(compute_pool)));

    let report = orchestrator.run().await;
    report.log_summary();

    Ok(if report.any_source_unreachable() { 2 } else { 0 })
}

fn lazy_pool(creds: &DbCredentials, database: &str) -> CliResult<MySqlPool> {
    MySqlPool::connect_lazy(&creds.url(database)).map_err(|e| CliError::Config {
        database: database.to_string(),
        message: e.to_string(),
    })
}
