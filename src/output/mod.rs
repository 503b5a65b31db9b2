//! Output module for persisting and summarizing snapshots
//!
//! This module handles:
//! - Writing the CSV snapshot of a finished crawl
//! - Reading a snapshot back into records
//! - Computing and printing snapshot statistics

mod snapshot;
pub mod stats;

pub use snapshot::{read_snapshot, write_snapshot};
pub use stats::{load_statistics, print_statistics, CategoryStatistics, SnapshotStatistics};
