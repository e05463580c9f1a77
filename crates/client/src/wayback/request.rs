//! Snapshot index query parameters and validation.

use rewind_core::{Collapse, SortOrder};

use super::IndexError;
use crate::transport::HttpRequest;

/// Fields requested from the index, in the order rows come back.
pub const FIELD_LIST: &str = "timestamp,original,mimetype,statuscode";

/// Only successful captures are listed.
pub const STATUS_FILTER: &str = "statuscode:200";

/// Default number of snapshots per query.
pub const DEFAULT_LIMIT: usize = 30;

/// A snapshot listing request for one normalized site URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotQuery {
    /// Normalized site URL.
    pub url: String,
    /// Maximum number of snapshots returned.
    pub limit: usize,
    /// Collapse bucket granularity.
    pub collapse: Collapse,
    /// Order of the returned list.
    pub order: SortOrder,
}

impl SnapshotQuery {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), limit: DEFAULT_LIMIT, collapse: Collapse::default(), order: SortOrder::default() }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_collapse(mut self, collapse: Collapse) -> Self {
        self.collapse = collapse;
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Validate the query parameters.
    ///
    /// Returns an error if the URL is empty or the limit is out of range.
    pub fn validate(&self, max_limit: usize) -> Result<(), IndexError> {
        if self.url.trim().is_empty() {
            return Err(IndexError::InvalidQuery("url cannot be empty".to_string()));
        }

        if self.limit == 0 {
            return Err(IndexError::InvalidQuery("limit must be at least 1".to_string()));
        }

        if self.limit > max_limit {
            return Err(IndexError::InvalidQuery(format!("limit too large: {} (max {max_limit})", self.limit)));
        }

        Ok(())
    }

    /// Build the index request against `endpoint`.
    pub fn to_request(&self, endpoint: &str) -> HttpRequest {
        HttpRequest::get(endpoint)
            .query("url", self.url.as_str())
            .query("output", "json")
            .query("limit", self.limit.to_string())
            .query("filter", STATUS_FILTER)
            .query("collapse", self.collapse.directive())
            .query("fl", FIELD_LIST)
            .header("Accept", "application/json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = SnapshotQuery::new("example.com");
        assert_eq!(query.limit, 30);
        assert_eq!(query.collapse, Collapse::Day);
        assert_eq!(query.order, SortOrder::Newest);
    }

    #[test]
    fn test_valid_query() {
        let query = SnapshotQuery::new("example.com").with_limit(100);
        assert!(query.validate(100).is_ok());
    }

    #[test]
    fn test_empty_url() {
        let query = SnapshotQuery::new("  ");
        assert!(matches!(query.validate(100), Err(IndexError::InvalidQuery(_))));
    }

    #[test]
    fn test_limit_bounds() {
        assert!(SnapshotQuery::new("example.com").with_limit(0).validate(100).is_err());
        assert!(SnapshotQuery::new("example.com").with_limit(101).validate(100).is_err());
    }

    #[test]
    fn test_to_request_params() {
        let req = SnapshotQuery::new("example.com")
            .with_limit(50)
            .with_collapse(Collapse::Month)
            .to_request("https://web.archive.org/cdx/search/cdx");

        assert_eq!(req.url, "https://web.archive.org/cdx/search/cdx");
        assert_eq!(req.query_value("url"), Some("example.com"));
        assert_eq!(req.query_value("output"), Some("json"));
        assert_eq!(req.query_value("limit"), Some("50"));
        assert_eq!(req.query_value("filter"), Some("statuscode:200"));
        assert_eq!(req.query_value("collapse"), Some("timestamp:6"));
        assert_eq!(req.query_value("fl"), Some("timestamp,original,mimetype,statuscode"));
    }
}
