//! Usage source abstraction.
//!
//! One implementation per external system. Each source aggregates over
//! its own rows (excluding logically-deleted ones) and is restricted to
//! a fixed, declared set of resource kinds; a source covering volumes
//! must never report a cores count. Sources hold their own connections
//! and never share state with the ledger store.

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::model::UsageSnapshot;

/// Ground-truth resource counts from one external system.
#[async_trait]
pub trait UsageSource: Send + Sync {
    /// Display name used in logs and reports.
    fn name(&self) -> &str;

    /// The resource kinds this source is responsible for, in the order
    /// the diff should visit them.
    fn resource_kinds(&self) -> &[&'static str];

    /// Compute actual per-tenant counts by aggregation.
    ///
    /// A tenant with zero matching rows is simply absent from the
    /// result, not an error. Counts are validated non-negative at
    /// recording time.
    async fn compute_actual_usage(&self) -> SyncResult<UsageSnapshot>;
}
