//! Cache key generation.
//!
//! Keys are SHA-256 digests over a namespace and newline-separated parts,
//! so callers can use arbitrary user text without worrying about separators.

use sha2::{Digest, Sha256};

use crate::snapshot::{Collapse, SortOrder, order_dates};

/// Compute a namespaced cache key from ordered parts.
pub fn compute_cache_key(namespace: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    for part in parts {
        hasher.update(b"\n");
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Key for a two-sided comparison of one site.
///
/// Order-independent: the two dates are sorted before being hashed, so
/// `(a, b)` and `(b, a)` address the same entry.
pub fn generate_key(url: &str, date1: &str, date2: &str) -> String {
    let (earlier, later) = order_dates(date1, date2);
    compute_cache_key("compare", &[url, earlier, later])
}

/// Key for a freeform timeline insight.
pub fn timeline_key(url: &str, oldest: &str, newest: &str, snapshot_count: usize) -> String {
    let (earlier, later) = order_dates(oldest, newest);
    let count = snapshot_count.to_string();
    compute_cache_key("timeline", &[url, earlier, later, &count])
}

/// Key for a snapshot list query.
pub fn snapshots_key(normalized_url: &str, limit: usize, collapse: Collapse, order: SortOrder) -> String {
    let limit = limit.to_string();
    compute_cache_key("snapshots", &[normalized_url, &limit, collapse.as_str(), order.as_str()])
}
