//! Insight request types and validation.

use rewind_core::Snapshot;
use rewind_core::snapshot::{SnapshotPair, compare_capture_dates, parse_capture_date};
use serde::{Deserialize, Serialize};

use super::InsightError;

/// Two-snapshot comparison request, as sent by callers.
///
/// The two sides may arrive in either order; [`ComparisonRequest::ordered`]
/// resolves which is earlier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub date1: String,
    #[serde(default)]
    pub date2: String,
    #[serde(default)]
    pub archive_url1: Option<String>,
    #[serde(default)]
    pub archive_url2: Option<String>,
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonSide {
    pub date: String,
    pub archive_url: Option<String>,
}

/// A validated comparison with its sides in chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedComparison {
    pub url: String,
    pub earlier: ComparisonSide,
    pub later: ComparisonSide,
}

impl ComparisonRequest {
    pub fn new(url: impl Into<String>, date1: impl Into<String>, date2: impl Into<String>) -> Self {
        Self { url: url.into(), date1: date1.into(), date2: date2.into(), archive_url1: None, archive_url2: None }
    }

    pub fn with_archive_urls(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.archive_url1 = Some(first.into());
        self.archive_url2 = Some(second.into());
        self
    }

    /// Build a request from two snapshots, in whatever order they were picked.
    pub fn from_snapshots(url: impl Into<String>, a: &Snapshot, b: &Snapshot) -> Self {
        let pair = SnapshotPair::new(a.clone(), b.clone());
        Self::new(url, pair.earlier.timestamp.as_str(), pair.later.timestamp.as_str())
            .with_archive_urls(pair.earlier.archive_url.as_str(), pair.later.archive_url.as_str())
    }

    /// Validate the request parameters.
    ///
    /// `url`, `date1`, and `date2` are required.
    pub fn validate(&self) -> Result<(), InsightError> {
        let missing: Vec<&str> = [("url", &self.url), ("date1", &self.date1), ("date2", &self.date2)]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();

        if !missing.is_empty() {
            return Err(InsightError::InvalidRequest(format!("missing required parameters: {}", missing.join(", "))));
        }

        Ok(())
    }

    /// Validate and put the two sides in chronological order.
    ///
    /// Archive URLs travel with their dates.
    pub fn ordered(&self) -> Result<OrderedComparison, InsightError> {
        self.validate()?;

        let first = ComparisonSide { date: self.date1.trim().to_string(), archive_url: self.archive_url1.clone() };
        let second = ComparisonSide { date: self.date2.trim().to_string(), archive_url: self.archive_url2.clone() };

        let (earlier, later) =
            if compare_capture_dates(&first.date, &second.date).is_gt() { (second, first) } else { (first, second) };

        Ok(OrderedComparison { url: self.url.trim().to_string(), earlier, later })
    }
}

/// Span of captures covered by a timeline request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub oldest: String,
    #[serde(default)]
    pub newest: String,
}

/// Freeform timeline insight request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub snapshot_count: usize,
    #[serde(default)]
    pub date_range: DateRange,
}

impl TimelineRequest {
    pub fn new(url: impl Into<String>, snapshot_count: usize, oldest: impl Into<String>, newest: impl Into<String>) -> Self {
        Self { url: url.into(), snapshot_count, date_range: DateRange { oldest: oldest.into(), newest: newest.into() } }
    }

    /// Summarize a snapshot list. Returns None for an empty list.
    pub fn from_snapshots(url: impl Into<String>, snapshots: &[Snapshot]) -> Option<Self> {
        let oldest = snapshots.iter().min_by(|a, b| a.timestamp.cmp(&b.timestamp))?;
        let newest = snapshots.iter().max_by(|a, b| a.timestamp.cmp(&b.timestamp))?;
        Some(Self::new(url, snapshots.len(), oldest.date.as_str(), newest.date.as_str()))
    }

    /// Validate the request parameters.
    ///
    /// `url` and both ends of the date range are required.
    pub fn validate(&self) -> Result<(), InsightError> {
        if self.url.trim().is_empty() {
            return Err(InsightError::InvalidRequest("url is required".to_string()));
        }

        if self.date_range.oldest.trim().is_empty() || self.date_range.newest.trim().is_empty() {
            return Err(InsightError::InvalidRequest("dateRange.oldest and dateRange.newest are required".to_string()));
        }

        Ok(())
    }

    /// Whole years between the ends of the range, rounded. Zero if either end
    /// does not parse.
    pub fn span_years(&self) -> i64 {
        let (Some(oldest), Some(newest)) =
            (parse_capture_date(&self.date_range.oldest), parse_capture_date(&self.date_range.newest))
        else {
            return 0;
        };

        let days = (newest - oldest).num_days().abs();
        (days as f64 / 365.0).round() as i64
    }
}
