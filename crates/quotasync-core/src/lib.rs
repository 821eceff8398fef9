//! # Quota Usage Reconciliation Engine
//!
//! Reconciles a cached quota-accounting ledger against ground-truth
//! resource counts aggregated from external service databases.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐
//! │ UsageSource  │   │  LedgerStore  │
//! │ (per system) │   │   (shared)    │
//! └──────┬───────┘   └───────┬───────┘
//!        │  actual usage     │  ledger snapshot
//!        ▼                   ▼
//!      ┌───────────────────────┐
//!      │         diff          │──► Correction stream
//!      └───────────────────────┘
//!                  │
//!                  ▼ conditional write (id + freshness token)
//!      ┌───────────────────────┐
//!      │   SyncOrchestrator    │──► SyncReport (one pass per source)
//!      └───────────────────────┘
//! ```
//!
//! Each pass works on point-in-time snapshots and is stateless and
//! restartable; corrections are applied under optimistic concurrency so
//! a stale read never clobbers a newer write.

pub mod diff;
pub mod error;
pub mod ledger;
pub mod model;
pub mod orchestrator;
pub mod report;
pub mod source;

pub use diff::diff;
pub use error::{SyncError, SyncResult};
pub use ledger::{ApplyOutcome, LedgerStore};
pub use model::{Correction, LedgerEntry, LedgerSnapshot, UsageSnapshot};
pub use orchestrator::SyncOrchestrator;
pub use report::{PassReport, PassStatistics, PassStatus, SyncReport};
pub use source::UsageSource;

// Re-export async_trait for trait implementors
pub use async_trait::async_trait;
