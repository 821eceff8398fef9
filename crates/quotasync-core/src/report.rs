//! Pass statistics and the aggregated sync report.
//!
//! The orchestrator collects one report per source instead of letting a
//! failure propagate past the pass it occurred in; callers inspect the
//! report after all sources have been attempted.

use serde::{Deserialize, Serialize};

use crate::ledger::ApplyOutcome;

/// Counters for a single source's pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassStatistics {
    /// Ledger entries in the snapshot the pass worked on.
    #[serde(default)]
    pub entries_loaded: u64,
    /// Corrections emitted by the diff.
    #[serde(default)]
    pub corrections: u64,
    /// Corrections whose conditional write matched.
    #[serde(default)]
    pub applied: u64,
    /// Corrections that lost the optimistic-concurrency race.
    #[serde(default)]
    pub stale: u64,
    /// Corrections that hit a write-time storage failure.
    #[serde(default)]
    pub failed: u64,
}

impl PassStatistics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one write attempt.
    pub fn record_outcome(&mut self, outcome: &ApplyOutcome) {
        match outcome {
            ApplyOutcome::Applied => self.applied += 1,
            ApplyOutcome::Stale => self.stale += 1,
            ApplyOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Check if any write attempt failed outright.
    #[must_use]
    pub fn has_write_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Terminal status of a single source's pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassStatus {
    /// The pass ran to completion (individual writes may still have
    /// been stale or failed).
    Completed,
    /// The source or ledger store could not be reached; nothing ran.
    Unreachable,
    /// A data integrity violation aborted the pass.
    Aborted,
}

impl PassStatus {
    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, PassStatus::Completed)
    }
}

impl std::fmt::Display for PassStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassStatus::Completed => write!(f, "completed"),
            PassStatus::Unreachable => write!(f, "unreachable"),
            PassStatus::Aborted => write!(f, "aborted"),
        }
    }
}

/// Result of one source's reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassReport {
    /// Source display name.
    pub source: String,
    pub status: PassStatus,
    /// Error message for unreachable or aborted passes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub statistics: PassStatistics,
    /// Whether the pass computed corrections without writing them.
    pub dry_run: bool,
}

impl PassReport {
    /// Build a report for a completed pass.
    #[must_use]
    pub fn completed(source: impl Into<String>, statistics: PassStatistics, dry_run: bool) -> Self {
        Self {
            source: source.into(),
            status: PassStatus::Completed,
            error_message: None,
            statistics,
            dry_run,
        }
    }

    /// Build a report for a pass that did not complete.
    #[must_use]
    pub fn failed(
        source: impl Into<String>,
        status: PassStatus,
        error: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            source: source.into(),
            status,
            error_message: Some(error.into()),
            statistics: PassStatistics::default(),
            dry_run,
        }
    }
}

/// Aggregated outcome of one orchestrator run: one pass per source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub passes: Vec<PassReport>,
}

impl SyncReport {
    /// Check whether any pass could not reach its store at all. This is
    /// the only condition that makes the process exit non-zero.
    #[must_use]
    pub fn any_source_unreachable(&self) -> bool {
        self.passes
            .iter()
            .any(|p| p.status == PassStatus::Unreachable)
    }

    /// Log one summary line per pass.
    pub fn log_summary(&self) {
        for pass in &self.passes {
            match pass.status {
                PassStatus::Completed => tracing::info!(
                    source = %pass.source,
                    dry_run = pass.dry_run,
                    entries = pass.statistics.entries_loaded,
                    corrections = pass.statistics.corrections,
                    applied = pass.statistics.applied,
                    stale = pass.statistics.stale,
                    failed = pass.statistics.failed,
                    "Pass completed"
                ),
                status => tracing::error!(
                    source = %pass.source,
                    status = %status,
                    error = pass.error_message.as_deref().unwrap_or(""),
                    "Pass did not complete"
                ),
            }
        }
    }
}
