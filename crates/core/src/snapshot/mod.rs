//! Snapshot data model.
//!
//! A [`Snapshot`] is one archived capture of a URL. It is built fresh from
//! every index query and never mutated afterwards; the derived fields
//! (calendar date, archive URLs) are computed once at construction.

pub mod archive;
pub mod timeline;
pub mod timestamp;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use archive::{ArchiveRoot, RenderMode};
pub use timeline::{SnapshotPair, YearGroup, compare_capture_dates, group_by_year, order_dates};
pub use timestamp::{Timestamp, TimestampError, parse_capture_date};

/// One archived capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// 14-digit capture identifier; primary sort key.
    pub timestamp: Timestamp,
    /// The live URL that was captured.
    pub original_url: String,
    pub mime_type: String,
    pub status_code: String,
    /// ISO calendar date (`YYYY-MM-DD`).
    pub date: String,
    /// Human-readable date, e.g. `Mar 5, 2020`.
    pub display_date: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Direct viewing URL.
    pub archive_url: String,
    /// Embeddable preview URL.
    pub screenshot_url: String,
}

impl Snapshot {
    pub fn new(
        timestamp: Timestamp, original_url: impl Into<String>, mime_type: impl Into<String>,
        status_code: impl Into<String>, root: &ArchiveRoot, preview: RenderMode,
    ) -> Self {
        let original_url = original_url.into();
        let date = timestamp.date();

        Self {
            archive_url: root.view_url(&timestamp, &original_url),
            screenshot_url: root.render_url(&timestamp, &original_url, preview),
            date: date.format("%Y-%m-%d").to_string(),
            display_date: display_date(date),
            year: timestamp.year(),
            month: timestamp.month(),
            day: timestamp.day(),
            timestamp,
            original_url,
            mime_type: mime_type.into(),
            status_code: status_code.into(),
        }
    }

    /// Bucket key under the given collapse granularity.
    pub fn bucket(&self, collapse: Collapse) -> &str {
        self.timestamp.prefix(collapse.prefix_len())
    }
}

/// `Mar 5, 2020`
pub fn display_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Collapse bucket granularity for deduplicating captures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Collapse {
    /// One capture per calendar day (`timestamp:8`).
    #[default]
    Day,
    /// One capture per calendar month (`timestamp:6`).
    Month,
}

impl Collapse {
    /// Number of leading timestamp digits forming the bucket key.
    pub fn prefix_len(self) -> usize {
        match self {
            Collapse::Day => 8,
            Collapse::Month => 6,
        }
    }

    /// Value of the index's `collapse` query parameter.
    pub fn directive(self) -> String {
        format!("timestamp:{}", self.prefix_len())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Collapse::Day => "day",
            Collapse::Month => "month",
        }
    }
}

impl fmt::Display for Collapse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collapse {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" | "8" => Ok(Collapse::Day),
            "month" | "monthly" | "6" => Ok(Collapse::Month),
            other => Err(format!("unknown collapse granularity: {other}")),
        }
    }
}

/// Order of returned snapshot lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest capture first.
    #[default]
    Newest,
    /// Oldest capture first.
    Oldest,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "desc" => Ok(SortOrder::Newest),
            "oldest" | "asc" => Ok(SortOrder::Oldest),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}
