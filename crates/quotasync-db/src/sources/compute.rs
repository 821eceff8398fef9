//! Compute usage source.
//!
//! Aggregates three independent queries over a compute service database
//! and merges them into one snapshot: instance counts with their vCPU
//! and memory totals, floating IP counts, and security group counts.
//! Each query produces a disjoint set of resource kinds, so the merged
//! result is the same whichever order the queries land in.

use async_trait::async_trait;
use sqlx::mysql::MySqlPool;
use sqlx::FromRow;

use quotasync_core::{SyncError, SyncResult, UsageSnapshot, UsageSource};

const SOURCE_NAME: &str = "compute";
const RESOURCE_KINDS: &[&str] = &[
    "instances",
    "cores",
    "ram",
    "floating_ips",
    "security_groups",
];

#[derive(Debug, Clone, FromRow)]
pub(crate) struct InstanceUsageRow {
    pub project_id: String,
    pub instances: i64,
    pub cores: i64,
    pub ram: i64,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct CountRow {
    pub project_id: String,
    pub total: i64,
}

/// Usage source over a compute service database.
pub struct ComputeSource {
    pool: MySqlPool,
}

impl ComputeSource {
    #[must_use]
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn instance_usage(&self) -> SyncResult<Vec<InstanceUsageRow>> {
        sqlx::query_as(
            "SELECT project_id, \
                    COUNT(vcpus) AS instances, \
                    CAST(COALESCE(SUM(vcpus), 0) AS SIGNED) AS cores, \
                    CAST(COALESCE(SUM(memory_mb), 0) AS SIGNED) AS ram \
             FROM instances \
             WHERE deleted = 0 \
             GROUP BY project_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SyncError::unavailable(SOURCE_NAME, e))
    }

    async fn count_per_project(&self, table: &str) -> SyncResult<Vec<CountRow>> {
        // Ownerless rows exist in both tables; they cannot be attributed
        // to a tenant and are excluded up front.
        let query = format!(
            "SELECT project_id, COUNT(*) AS total \
             FROM {table} \
             WHERE deleted = 0 AND project_id IS NOT NULL \
             GROUP BY project_id"
        );
        sqlx::query_as(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SyncError::unavailable(SOURCE_NAME, e))
    }
}

#[async_trait]
impl UsageSource for ComputeSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn resource_kinds(&self) -> &[&'static str] {
        RESOURCE_KINDS
    }

    async fn compute_actual_usage(&self) -> SyncResult<UsageSnapshot> {
        let instances = self.instance_usage().await?;
        let floating_ips = self.count_per_project("floating_ips").await?;
        let security_groups = self.count_per_project("security_groups").await?;

        tracing::debug!(
            instance_projects = instances.len(),
            floating_ip_projects = floating_ips.len(),
            security_group_projects = security_groups.len(),
            "Computed compute usage"
        );
        merge_compute_rows(instances, floating_ips, security_groups)
    }
}

pub(crate) fn merge_compute_rows(
    instances: Vec<InstanceUsageRow>,
    floating_ips: Vec<CountRow>,
    security_groups: Vec<CountRow>,
) -> SyncResult<UsageSnapshot> {
    let mut snapshot = UsageSnapshot::new();
    for row in instances {
        snapshot.record(row.project_id.clone(), "instances", row.instances)?;
        snapshot.record(row.project_id.clone(), "cores", row.cores)?;
        snapshot.record(row.project_id, "ram", row.ram)?;
    }
    for row in floating_ips {
        snapshot.record(row.project_id, "floating_ips", row.total)?;
    }
    for row in security_groups {
        snapshot.record(row.project_id, "security_groups", row.total)?;
    }
    Ok(snapshot)
}
