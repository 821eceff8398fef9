//! Usage source adapters over service databases.
//!
//! Each adapter owns its own connection pool and computes actual usage
//! for the resource kinds it declares; adapters never touch the ledger.

mod block_storage;
mod compute;

pub use block_storage::BlockStorageSource;
pub use compute::ComputeSource;
