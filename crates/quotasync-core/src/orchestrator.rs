//! Sync orchestrator.
//!
//! Drives one reconciliation pass per registered source against a single
//! shared ledger store. Each pass takes its own ledger snapshot, so
//! passes share no mutable state; a failure in one source never prevents
//! the others from completing. Corrections within a pass are applied
//! sequentially — the conditional-write semantics of the ledger store
//! are what make concurrent external writers safe.

use crate::diff::diff;
use crate::error::SyncError;
use crate::ledger::LedgerStore;
use crate::report::{PassReport, PassStatistics, PassStatus, SyncReport};
use crate::source::UsageSource;

/// Orchestrates reconciliation passes over registered usage sources.
pub struct SyncOrchestrator<L> {
    ledger: L,
    sources: Vec<Box<dyn UsageSource>>,
    dry_run: bool,
}

impl<L: LedgerStore> SyncOrchestrator<L> {
    /// Create an orchestrator over a shared ledger store.
    #[must_use]
    pub fn new(ledger: L) -> Self {
        Self {
            ledger,
            sources: Vec::new(),
            dry_run: false,
        }
    }

    /// Compute and log corrections without ever invoking the write path.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Register a usage source for reconciliation.
    pub fn register(&mut self, source: Box<dyn UsageSource>) {
        self.sources.push(source);
    }

    /// Run one pass per registered source, in registration order.
    ///
    /// Failures are collected into the report rather than propagated, so
    /// every source is attempted exactly once.
    pub async fn run(&self) -> SyncReport {
        let mut report = SyncReport::default();
        for source in &self.sources {
            report.passes.push(self.run_pass(source.as_ref()).await);
        }
        report
    }

    async fn run_pass(&self, source: &dyn UsageSource) -> PassReport {
        tracing::debug!(
            source = %source.name(),
            kinds = ?source.resource_kinds(),
            dry_run = self.dry_run,
            "Starting reconciliation pass"
        );

        let ledger = match self.ledger.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => return self.pass_failure(source.name(), e),
        };
        let actual = match source.compute_actual_usage().await {
            Ok(snapshot) => snapshot,
            Err(e) => return self.pass_failure(source.name(), e),
        };

        let mut stats = PassStatistics::new();
        stats.entries_loaded = ledger.len() as u64;

        for correction in diff(&ledger, &actual, source.resource_kinds()) {
            stats.corrections += 1;
            if self.dry_run {
                tracing::info!(
                    target: "audit",
                    tenant = %correction.tenant_id,
                    resource = %correction.resource,
                    in_use = correction.new_value,
                    entry_id = correction.entry_id,
                    token = ?correction.freshness_token,
                    "dry run: correction not applied"
                );
                continue;
            }
            let outcome = self.ledger.apply(&correction).await;
            tracing::info!(
                target: "audit",
                tenant = %correction.tenant_id,
                resource = %correction.resource,
                in_use = correction.new_value,
                outcome = %outcome,
                "Write attempted"
            );
            stats.record_outcome(&outcome);
        }

        PassReport::completed(source.name(), stats, self.dry_run)
    }

    fn pass_failure(&self, source_name: &str, error: SyncError) -> PassReport {
        let status = if error.is_source_unavailable() {
            PassStatus::Unreachable
        } else {
            PassStatus::Aborted
        };
        tracing::error!(
            source = %source_name,
            status = %status,
            error = %error,
            "Reconciliation pass failed"
        );
        PassReport::failed(source_name, status, error.to_string(), self.dry_run)
    }
}
