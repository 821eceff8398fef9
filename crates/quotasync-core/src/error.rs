//! Error types for reconciliation passes.
//!
//! Errors abort the pass they occur in; they are never fatal to the
//! whole process. Lost optimistic-concurrency races and per-correction
//! write failures are [`ApplyOutcome`](crate::ledger::ApplyOutcome)
//! values, not errors.

use thiserror::Error;

/// Result type for reconciliation operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can abort a single source's reconciliation pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The backing store for a source (or the ledger) could not be reached.
    #[error("source unavailable: {source_name}: {message}")]
    SourceUnavailable {
        source_name: String,
        message: String,
    },

    /// The ledger snapshot contains more than one row for a
    /// (tenant, resource) pair. The uniqueness invariant is violated
    /// upstream; the pass is aborted so a stale row is never corrected
    /// by guesswork.
    #[error("duplicate ledger entry for tenant '{tenant_id}' resource '{resource}'")]
    DuplicateLedgerEntry {
        tenant_id: String,
        resource: String,
    },

    /// A negative count was read from either snapshot. Counts are never
    /// coerced; the bad row is reported with enough context to locate it.
    #[error("negative count for tenant '{tenant_id}' resource '{resource}': {value}")]
    NegativeCount {
        tenant_id: String,
        resource: String,
        value: i64,
    },
}

impl SyncError {
    /// Build a `SourceUnavailable` from any displayable cause.
    pub fn unavailable(source_name: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        SyncError::SourceUnavailable {
            source_name: source_name.into(),
            message: cause.to_string(),
        }
    }

    /// Check if this error indicates an unreachable store.
    #[must_use]
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, SyncError::SourceUnavailable { .. })
    }

    /// Check if this error indicates a data integrity violation
    /// (duplicate ledger key or malformed count).
    #[must_use]
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            SyncError::DuplicateLedgerEntry { .. } | SyncError::NegativeCount { .. }
        )
    }
}
