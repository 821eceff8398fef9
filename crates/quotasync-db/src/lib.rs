//! MySQL bindings for the quota reconciliation engine.
//!
//! Provides the [`QuotaLedger`] store over the `quota_usages` table and
//! the usage source adapters that compute ground-truth counts from the
//! block-storage and compute service databases.

pub mod ledger;
pub mod sources;

pub use ledger::QuotaLedger;
pub use sources::{BlockStorageSource, ComputeSource};
