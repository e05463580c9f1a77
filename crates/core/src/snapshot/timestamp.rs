//! Archive capture timestamps (`YYYYMMDDHHMMSS`).

use std::fmt;

use chrono::{DateTime, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Length of a capture timestamp.
pub const TIMESTAMP_LEN: usize = 14;

/// Why a timestamp string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("expected 14 characters, got {0}")]
    Length(usize),

    #[error("timestamp must be numeric")]
    NonNumeric,

    #[error("timestamp does not name a calendar date")]
    InvalidDate,
}

/// A validated 14-digit capture identifier.
///
/// Ordering is lexicographic, which matches chronological order because the
/// format is fixed-width and numeric.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(String);

impl Timestamp {
    /// Parse a capture timestamp, rejecting anything that is not exactly
    /// 14 ASCII digits naming a real calendar date.
    pub fn parse(raw: &str) -> Result<Self, TimestampError> {
        if raw.len() != TIMESTAMP_LEN {
            return Err(TimestampError::Length(raw.len()));
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimestampError::NonNumeric);
        }

        let ts = Self(raw.to_string());
        if ts.date_opt().is_none() {
            return Err(TimestampError::InvalidDate);
        }
        Ok(ts)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Year from positions [0:4].
    pub fn year(&self) -> i32 {
        self.digits(0, 4) as i32
    }

    /// Month from positions [4:6].
    pub fn month(&self) -> u32 {
        self.digits(4, 6)
    }

    /// Day from positions [6:8].
    pub fn day(&self) -> u32 {
        self.digits(6, 8)
    }

    /// Calendar date from the first eight digits.
    pub fn date(&self) -> NaiveDate {
        self.date_opt().unwrap_or_default()
    }

    /// Prefix used as the collapse bucket key (8 = day, 6 = month).
    pub fn prefix(&self, len: usize) -> &str {
        self.0.get(..len).unwrap_or(&self.0)
    }

    fn date_opt(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year(), self.month(), self.day())
    }

    fn digits(&self, start: usize, end: usize) -> u32 {
        self.0.get(start..end).and_then(|s| s.parse().ok()).unwrap_or(0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = TimestampError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

/// Parse a caller-supplied capture date.
///
/// Accepts 14- or 8-digit archive timestamps, `YYYY-MM-DD`, RFC 3339, and
/// the display form `Mon D, YYYY`.
pub fn parse_capture_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(ts) = Timestamp::parse(raw) {
        return Some(ts.date());
    }
    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(raw, "%Y%m%d").ok();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%b %d, %Y").ok()
}
