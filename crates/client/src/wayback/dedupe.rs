//! Deduplication, ordering and capping of parsed snapshots.
//!
//! The index is asked to collapse captures itself; this pass re-applies the
//! same bucket rule so the no-duplicate-bucket guarantee holds even when the
//! upstream ignores the directive.

use std::collections::HashSet;

use rewind_core::{Collapse, Snapshot, SortOrder};

/// Produce the public-facing list.
///
/// 1. Keep the first snapshot per collapse bucket, in index order
/// 2. Sort by timestamp in the requested order
/// 3. Truncate to `limit`
pub fn finalize(snapshots: Vec<Snapshot>, collapse: Collapse, order: SortOrder, limit: usize) -> Vec<Snapshot> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Snapshot> = snapshots
        .into_iter()
        .filter(|s| seen.insert(s.bucket(collapse).to_string()))
        .collect();

    match order {
        SortOrder::Newest => unique.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        SortOrder::Oldest => unique.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
    }

    unique.truncate(limit);
    unique
}
