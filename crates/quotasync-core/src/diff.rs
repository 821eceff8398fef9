//! Reconciliation diff.
//!
//! Produces the corrections needed to bring reported ledger counts in
//! line with computed actual usage. The sequence is lazy, finite, and
//! deterministic: sorted tenant id first, then the order the source
//! declared its resource kinds in.

use crate::model::{Correction, LedgerSnapshot, UsageSnapshot};

/// Diff a ledger snapshot against computed actual usage.
///
/// For each ledger tenant and each declared resource kind:
/// - a pair with no ledger entry is skipped — the engine only corrects
///   existing rows, it never inserts new ones;
/// - a pair missing from `actual` counts as zero, never as "skip";
/// - every observation is audit-logged, equal or not;
/// - a [`Correction`] is emitted iff actual differs from reported,
///   carrying the entry's id and freshness token unchanged.
///
/// Tenants present only in `actual` are audit-logged and produce
/// nothing. Audit lines are emitted as the sequence is consumed.
pub fn diff<'a>(
    ledger: &'a LedgerSnapshot,
    actual: &'a UsageSnapshot,
    resource_kinds: &'a [&'static str],
) -> impl Iterator<Item = Correction> + 'a {
    for tenant_id in actual.tenants() {
        if !ledger.contains_tenant(tenant_id) {
            tracing::debug!(
                target: "audit",
                tenant = %tenant_id,
                "tenant has actual usage but no ledger rows"
            );
        }
    }

    ledger.tenants().flat_map(move |tenant_id| {
        resource_kinds.iter().filter_map(move |resource| {
            let entry = ledger.get(tenant_id, resource)?;
            let reported = entry.in_use;
            let actual_in_use = actual.get(tenant_id, resource).unwrap_or(0);

            tracing::info!(
                target: "audit",
                tenant = %tenant_id,
                resource = %resource,
                actual = actual_in_use,
                reported = reported,
                "usage observed"
            );

            if actual_in_use == reported {
                return None;
            }
            Some(Correction {
                tenant_id: entry.tenant_id.clone(),
                resource: entry.resource.clone(),
                new_value: actual_in_use,
                entry_id: entry.entry_id,
                freshness_token: entry.freshness_token,
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LedgerEntry;
    use chrono::NaiveDate;

    fn token(secs: u32) -> Option<chrono::NaiveDateTime> {
        NaiveDate::from_ymd_opt(2026, 8, 20)
            .unwrap()
            .and_hms_opt(12, 0, secs)
    }

    fn entry(tenant: &str, resource: &str, in_use: i64, id: i64) -> LedgerEntry {
        LedgerEntry {
            tenant_id: tenant.to_string(),
            resource: resource.to_string(),
            in_use,
            entry_id: id,
            freshness_token: token(0),
        }
    }

    #[test]
    fn test_missing_actual_counts_as_zero() {
        let mut ledger = LedgerSnapshot::new();
        ledger.insert(entry("t1", "volumes", 3, 42)).unwrap();
        let actual = UsageSnapshot::new();

        let corrections: Vec<Correction> = diff(&ledger, &actual, &["volumes"]).collect();
        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].new_value, 0);
        assert_eq!(corrections[0].entry_id, 42);
    }

    #[test]
    fn test_tenant_absent_from_ledger_never_corrected() {
        let ledger = LedgerSnapshot::new();
        let mut actual = UsageSnapshot::new();
        actual.record("ghost", "volumes", 7).unwrap();

        let corrections: Vec<Correction> = diff(&ledger, &actual, &["volumes"]).collect();
        assert!(corrections.is_empty());
    }

    #[test]
    fn test_equal_counts_emit_nothing() {
        let mut ledger = LedgerSnapshot::new();
        ledger.insert(entry("t1", "volumes", 3, 42)).unwrap();
        let mut actual = UsageSnapshot::new();
        actual.record("t1", "volumes", 3).unwrap();

        let corrections: Vec<Correction> = diff(&ledger, &actual, &["volumes"]).collect();
        assert!(corrections.is_empty());
    }

    #[test]
    fn test_mismatch_carries_id_and_token() {
        let mut ledger = LedgerSnapshot::new();
        ledger.insert(entry("t1", "volumes", 3, 42)).unwrap();
        let mut actual = UsageSnapshot::new();
        actual.record("t1", "volumes", 5).unwrap();

        let corrections: Vec<Correction> = diff(&ledger, &actual, &["volumes"]).collect();
        assert_eq!(
            corrections,
            vec![Correction {
                tenant_id: "t1".to_string(),
                resource: "volumes".to_string(),
                new_value: 5,
                entry_id: 42,
                freshness_token: token(0),
            }]
        );
    }

    #[test]
    fn test_undeclared_kinds_are_not_visited() {
        // An adapter restricted to volumes/gigabytes must never touch a
        // cores row even when the ledger has one.
        let mut ledger = LedgerSnapshot::new();
        ledger.insert(entry("t1", "cores", 4, 1)).unwrap();
        let actual = UsageSnapshot::new();

        let corrections: Vec<Correction> =
            diff(&ledger, &actual, &["volumes", "gigabytes"]).collect();
        assert!(corrections.is_empty());
    }

    #[test]
    fn test_pair_without_ledger_entry_is_skipped() {
        let mut ledger = LedgerSnapshot::new();
        ledger.insert(entry("t1", "volumes", 3, 1)).unwrap();
        let mut actual = UsageSnapshot::new();
        actual.record("t1", "volumes", 3).unwrap();
        // gigabytes has actual data but no ledger row: nothing to reconcile.
        actual.record("t1", "gigabytes", 30).unwrap();

        let corrections: Vec<Correction> =
            diff(&ledger, &actual, &["volumes", "gigabytes"]).collect();
        assert!(corrections.is_empty());
    }

    #[test]
    fn test_order_is_sorted_tenant_then_declared_kinds() {
        let mut ledger = LedgerSnapshot::new();
        ledger.insert(entry("zeta", "gigabytes", 1, 1)).unwrap();
        ledger.insert(entry("zeta", "volumes", 1, 2)).unwrap();
        ledger.insert(entry("alpha", "volumes", 1, 3)).unwrap();
        ledger.insert(entry("alpha", "gigabytes", 1, 4)).unwrap();
        let actual = UsageSnapshot::new();

        let seen: Vec<(String, String)> = diff(&ledger, &actual, &["volumes", "gigabytes"])
            .map(|c| (c.tenant_id, c.resource))
            .collect();
        assert_eq!(
            seen,
            vec![
                ("alpha".to_string(), "volumes".to_string()),
                ("alpha".to_string(), "gigabytes".to_string()),
                ("zeta".to_string(), "volumes".to_string()),
                ("zeta".to_string(), "gigabytes".to_string()),
            ]
        );
    }
}
