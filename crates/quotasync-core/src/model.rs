//! Snapshot types for reconciliation.
//!
//! A pass works on two read-only snapshots taken once at its start: the
//! reported-usage ledger and the actual usage computed by a source. Both
//! enforce their uniqueness invariants at insertion time so the diff can
//! assume well-formed input.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;

use crate::error::{SyncError, SyncResult};

/// One row of reported usage from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub tenant_id: String,
    pub resource: String,
    /// Reported count. Validated non-negative at load time.
    pub in_use: i64,
    /// Row identity used for the targeted conditional update.
    pub entry_id: i64,
    /// Last-modified timestamp at read time. `None` for rows that were
    /// never updated; compared NULL-safe by the updater.
    pub freshness_token: Option<NaiveDateTime>,
}

/// A proposed overwrite of a ledger row's count.
///
/// Created by the diff, consumed exactly once by the updater, then
/// discarded. `entry_id` and `freshness_token` are copied unmodified from
/// the entry the correction was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub tenant_id: String,
    pub resource: String,
    pub new_value: i64,
    pub entry_id: i64,
    pub freshness_token: Option<NaiveDateTime>,
}

/// Normalized snapshot of the reported-usage ledger.
///
/// At most one entry per (tenant, resource); tenants iterate in sorted
/// order so diff output is deterministic.
#[derive(Debug, Default)]
pub struct LedgerSnapshot {
    entries: BTreeMap<String, HashMap<String, LedgerEntry>>,
    len: usize,
}

impl LedgerSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, rejecting duplicates and negative counts.
    pub fn insert(&mut self, entry: LedgerEntry) -> SyncResult<()> {
        if entry.in_use < 0 {
            return Err(SyncError::NegativeCount {
                tenant_id: entry.tenant_id,
                resource: entry.resource,
                value: entry.in_use,
            });
        }
        let per_tenant = self.entries.entry(entry.tenant_id.clone()).or_default();
        if per_tenant.contains_key(&entry.resource) {
            return Err(SyncError::DuplicateLedgerEntry {
                tenant_id: entry.tenant_id,
                resource: entry.resource,
            });
        }
        per_tenant.insert(entry.resource.clone(), entry);
        self.len += 1;
        Ok(())
    }

    /// Look up the entry for a (tenant, resource) pair.
    #[must_use]
    pub fn get(&self, tenant_id: &str, resource: &str) -> Option<&LedgerEntry> {
        self.entries.get(tenant_id).and_then(|m| m.get(resource))
    }

    /// Check whether a tenant has any ledger rows.
    #[must_use]
    pub fn contains_tenant(&self, tenant_id: &str) -> bool {
        self.entries.contains_key(tenant_id)
    }

    /// Tenant ids in sorted order.
    pub fn tenants(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Total number of ledger entries in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Computed actual usage for one source.
///
/// Absence of a (tenant, resource) pair means zero for diff purposes.
/// Multiple aggregation queries merge through repeated [`record`] calls;
/// the merge is commutative because a pair may be recorded at most once.
///
/// [`record`]: UsageSnapshot::record
#[derive(Debug, Default)]
pub struct UsageSnapshot {
    counts: HashMap<String, HashMap<String, i64>>,
}

impl UsageSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a computed count, rejecting negatives and duplicate pairs.
    ///
    /// Duplicate (tenant, resource) within one source would make the
    /// merged result depend on query order, so it is an integrity error.
    pub fn record(
        &mut self,
        tenant_id: impl Into<String>,
        resource: impl Into<String>,
        count: i64,
    ) -> SyncResult<()> {
        let tenant_id = tenant_id.into();
        let resource = resource.into();
        if count < 0 {
            return Err(SyncError::NegativeCount {
                tenant_id,
                resource,
                value: count,
            });
        }
        let per_tenant = self.counts.entry(tenant_id.clone()).or_default();
        if per_tenant.contains_key(&resource) {
            return Err(SyncError::DuplicateLedgerEntry {
                tenant_id,
                resource,
            });
        }
        per_tenant.insert(resource, count);
        Ok(())
    }

    /// Computed count for a pair, if the source reported one.
    #[must_use]
    pub fn get(&self, tenant_id: &str, resource: &str) -> Option<i64> {
        self.counts
            .get(tenant_id)
            .and_then(|m| m.get(resource))
            .copied()
    }

    /// Tenant ids present in this snapshot, in no particular order.
    pub fn tenants(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }
}
