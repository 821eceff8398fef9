//! Block-storage usage source.
//!
//! Counts non-deleted volumes per project: one aggregation query yields
//! both the volume count and the summed capacity in gigabytes.

use async_trait::async_trait;
use sqlx::mysql::MySqlPool;
use sqlx::FromRow;

use quotasync_core::{SyncError, SyncResult, UsageSnapshot, UsageSource};

const SOURCE_NAME: &str = "block-storage";
const RESOURCE_KINDS: &[&str] = &["volumes", "gigabytes"];

#[derive(Debug, Clone, FromRow)]
pub(crate) struct VolumeUsageRow {
    pub project_id: String,
    pub volumes: i64,
    pub gigabytes: i64,
}

/// Usage source over a block-storage service database.
pub struct BlockStorageSource {
    pool: MySqlPool,
}

impl BlockStorageSource {
    #[must_use]
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageSource for BlockStorageSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn resource_kinds(&self) -> &[&'static str] {
        RESOURCE_KINDS
    }

    async fn compute_actual_usage(&self) -> SyncResult<UsageSnapshot> {
        let rows: Vec<VolumeUsageRow> = sqlx::query_as(
            "SELECT project_id, \
                    COUNT(size) AS volumes, \
                    CAST(COALESCE(SUM(size), 0) AS SIGNED) AS gigabytes \
             FROM volumes \
             WHERE deleted = 0 \
             GROUP BY project_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SyncError::unavailable(SOURCE_NAME, e))?;

        tracing::debug!(projects = rows.len(), "Computed block-storage usage");
        merge_volume_rows(rows)
    }
}

pub(crate) fn merge_volume_rows(rows: Vec<VolumeUsageRow>) -> SyncResult<UsageSnapshot> {
    let mut snapshot = UsageSnapshot::new();
    for row in rows {
        snapshot.record(row.project_id.clone(), "volumes", row.volumes)?;
        snapshot.record(row.project_id, "gigabytes", row.gigabytes)?;
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(project: &str, volumes: i64, gigabytes: i64) -> VolumeUsageRow {
        VolumeUsageRow {
            project_id: project.to_string(),
            volumes,
            gigabytes,
        }
    }

    #[test]
    fn test_merge_records_both_kinds() {
        let snapshot = merge_volume_rows(vec![row("t1", 3, 30), row("t2", 0, 0)]).unwrap();
        assert_eq!(snapshot.get("t1", "volumes"), Some(3));
        assert_eq!(snapshot.get("t1", "gigabytes"), Some(30));
        assert_eq!(snapshot.get("t2", "volumes"), Some(0));
    }

    #[test]
    fn test_merge_rejects_negative_capacity() {
        let err = merge_volume_rows(vec![row("t1", 1, -5)]).unwrap_err();
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_merge_rejects_repeated_project() {
        // GROUP BY guarantees one row per project; a repeat means the
        // query result is malformed and must not be folded silently.
        let err = merge_volume_rows(vec![row("t1", 1, 10), row("t1", 2, 20)]).unwrap_err();
        assert!(err.is_data_integrity());
    }
}
