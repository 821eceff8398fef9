//! MySQL-backed ledger store.
//!
//! Reads the `quota_usages` table into a snapshot and applies
//! corrections through a single conditional `UPDATE` keyed on the row
//! id and the `updated_at` value read with the snapshot. The freshness
//! comparison uses the NULL-safe `<=>` operator so rows that were never
//! updated still participate in the optimistic-concurrency check.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::mysql::MySqlPool;
use sqlx::FromRow;

use quotasync_core::{
    ApplyOutcome, Correction, LedgerEntry, LedgerSnapshot, LedgerStore, SyncError, SyncResult,
};

/// One `quota_usages` row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct QuotaUsageRow {
    pub id: i64,
    pub project_id: String,
    pub resource: String,
    pub in_use: i64,
    pub updated_at: Option<NaiveDateTime>,
}

impl From<QuotaUsageRow> for LedgerEntry {
    fn from(row: QuotaUsageRow) -> Self {
        LedgerEntry {
            tenant_id: row.project_id,
            resource: row.resource,
            in_use: row.in_use,
            entry_id: row.id,
            freshness_token: row.updated_at,
        }
    }
}

/// Ledger store over a MySQL `quota_usages` table.
pub struct QuotaLedger {
    pool: MySqlPool,
}

impl QuotaLedger {
    #[must_use]
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for QuotaLedger {
    async fn load(&self) -> SyncResult<LedgerSnapshot> {
        let rows: Vec<QuotaUsageRow> = sqlx::query_as(
            "SELECT id, project_id, resource, in_use, updated_at FROM quota_usages",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SyncError::unavailable("ledger", e))?;

        tracing::debug!(rows = rows.len(), "Loaded ledger snapshot");

        let mut snapshot = LedgerSnapshot::new();
        for row in rows {
            snapshot.insert(row.into())?;
        }
        Ok(snapshot)
    }

    async fn apply(&self, correction: &Correction) -> ApplyOutcome {
        // One statement does both the freshness check and the write; a
        // zero-row match means the row changed since the snapshot.
        let result = sqlx::query(
            "UPDATE quota_usages \
             SET in_use = ?, updated_at = CURRENT_TIMESTAMP \
             WHERE id = ? AND updated_at <=> ?",
        )
        .bind(correction.new_value)
        .bind(correction.entry_id)
        .bind(correction.freshness_token)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => ApplyOutcome::Stale,
            Ok(_) => ApplyOutcome::Applied,
            Err(e) => ApplyOutcome::Failed(e.to_string()),
        }
    }
}
