//! Timeline helpers: year grouping and earlier/later ordering.

use std::cmp::Ordering;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Snapshot, parse_capture_date};

/// Snapshots captured in the same calendar year.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct YearGroup {
    pub year: i32,
    pub snapshots: Vec<Snapshot>,
}

/// Group snapshots by capture year.
///
/// Groups appear in the order their first member appears in the input, and
/// members keep their relative input order.
pub fn group_by_year(snapshots: &[Snapshot]) -> Vec<YearGroup> {
    let mut groups: Vec<YearGroup> = Vec::new();

    for snapshot in snapshots {
        match groups.iter_mut().find(|g| g.year == snapshot.year) {
            Some(group) => group.snapshots.push(snapshot.clone()),
            None => groups.push(YearGroup { year: snapshot.year, snapshots: vec![snapshot.clone()] }),
        }
    }

    groups
}

/// Two snapshots ordered so that `earlier` never has the larger timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPair {
    pub earlier: Snapshot,
    pub later: Snapshot,
}

impl SnapshotPair {
    /// Order two snapshots regardless of the order they were passed in.
    pub fn new(a: Snapshot, b: Snapshot) -> Self {
        if a.timestamp <= b.timestamp { Self { earlier: a, later: b } } else { Self { earlier: b, later: a } }
    }
}

/// Compare two caller-supplied capture dates.
///
/// Parsed calendar dates decide; when they tie or either side does not
/// parse, the raw strings are compared so the result stays total.
pub fn compare_capture_dates(a: &str, b: &str) -> Ordering {
    match (parse_capture_date(a), parse_capture_date(b)) {
        (Some(da), Some(db)) => da.cmp(&db).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

/// Return `(earlier, later)` for two capture dates.
pub fn order_dates<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if compare_capture_dates(a, b) == Ordering::Greater { (b, a) } else { (a, b) }
}
