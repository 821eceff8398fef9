//! Ledger store abstraction.
//!
//! The ledger is read once per pass as a snapshot and written through a
//! conditional update keyed on row identity plus the freshness token read
//! with the snapshot. The token check is what makes concurrent external
//! writers safe; there is no in-process locking.

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::model::{Correction, LedgerSnapshot};

/// Outcome of applying a single correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The conditional write matched and the stored count was updated.
    Applied,
    /// Zero rows matched: the row changed between read and write. The
    /// entry will be picked up again on the next scheduled pass; it is
    /// never retried within the same pass.
    Stale,
    /// A transport or storage failure during the write. Reported
    /// per-correction; remaining corrections still run.
    Failed(String),
}

impl ApplyOutcome {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied)
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, ApplyOutcome::Stale)
    }
}

impl std::fmt::Display for ApplyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplyOutcome::Applied => write!(f, "applied"),
            ApplyOutcome::Stale => write!(f, "stale"),
            ApplyOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Authoritative reported-usage store.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Load the full ledger into a normalized snapshot.
    ///
    /// Fails with `SourceUnavailable` when the store cannot be reached
    /// and with a data-integrity error on duplicate (tenant, resource)
    /// rows or negative counts; rows are never silently dropped.
    async fn load(&self) -> SyncResult<LedgerSnapshot>;

    /// Apply one correction with a single conditional write:
    /// set `in_use = new_value` where the row id and freshness token
    /// both still match. Implementations must detect the zero-rows case
    /// explicitly and report it as [`ApplyOutcome::Stale`], never as
    /// success, and must never split the check and the write.
    async fn apply(&self, correction: &Correction) -> ApplyOutcome;
}
