//! Append-only version history, restore, and comparison.

pub mod diff;
pub mod service;

pub use diff::{ChangeCounts, LineDiff, diff_lines};
pub use service::{HistoryPage, RestoreOutcome, VersionComparison, VersionService};
