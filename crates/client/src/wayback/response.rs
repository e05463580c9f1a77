//! Index response parsing.
//!
//! The index answers with a JSON array of string arrays. Row 0 is the
//! header; every following row is `[timestamp, original, mimetype, statuscode]`
//! in the order of [`FIELD_LIST`](super::request::FIELD_LIST).

use rewind_core::snapshot::{ArchiveRoot, RenderMode, Snapshot, Timestamp};
use serde_json::Value;

use super::IndexError;

/// Snapshots parsed from one response plus the count of dropped rows.
#[derive(Debug, Clone, Default)]
pub struct ParsedRows {
    pub snapshots: Vec<Snapshot>,
    pub skipped: usize,
}

/// Parse an index response body.
///
/// An empty body or a header-only table is a valid "no captures" outcome.
/// Rows with the wrong arity, non-string cells, a malformed timestamp, an
/// empty original URL, or a non-200 status are dropped and counted in
/// `skipped`; they never fail the batch.
pub fn parse_rows(body: &[u8], root: &ArchiveRoot, preview: RenderMode) -> Result<ParsedRows, IndexError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(ParsedRows::default());
    }

    let rows: Vec<Value> = serde_json::from_slice(body).map_err(|e| IndexError::InvalidResponse(e.to_string()))?;

    let mut parsed = ParsedRows::default();
    for row in rows.iter().skip(1) {
        match parse_row(row, root, preview) {
            Some(snapshot) => parsed.snapshots.push(snapshot),
            None => parsed.skipped += 1,
        }
    }

    Ok(parsed)
}

fn parse_row(row: &Value, root: &ArchiveRoot, preview: RenderMode) -> Option<Snapshot> {
    let [timestamp, original, mime_type, status_code] = row.as_array()?.as_slice() else {
        return None;
    };

    let timestamp = Timestamp::parse(timestamp.as_str()?).ok()?;
    let original = original.as_str().filter(|s| !s.is_empty())?;
    let mime_type = mime_type.as_str()?;
    let status_code = status_code.as_str()?;

    if status_code != "200" {
        return None;
    }

    Some(Snapshot::new(timestamp, original, mime_type, status_code, root, preview))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_JSON: &str = r#"[
        ["timestamp", "original", "mimetype", "statuscode"],
        ["20100105093000", "http://www.example.com/", "text/html", "200"],
        ["20150612110000", "http://example.com/", "text/html", "200"],
        ["20200305142233", "https://example.com/", "text/html", "200"]
    ]"#;

    fn parse(body: &str) -> ParsedRows {
        parse_rows(body.as_bytes(), &ArchiveRoot::default(), RenderMode::Iframe).unwrap()
    }

    #[test]
    fn test_parse_fixture() {
        let parsed = parse(FIXTURE_JSON);
        assert_eq!(parsed.snapshots.len(), 3);
        assert_eq!(parsed.skipped, 0);

        let first = &parsed.snapshots[0];
        assert_eq!(first.timestamp.as_str(), "20100105093000");
        assert_eq!(first.original_url, "http://www.example.com/");
        assert_eq!(first.mime_type, "text/html");
        assert_eq!(first.status_code, "200");
        assert_eq!(first.archive_url, "https://web.archive.org/web/20100105093000/http://www.example.com/");
    }

    #[test]
    fn test_empty_body() {
        let parsed = parse("");
        assert!(parsed.snapshots.is_empty());
        assert_eq!(parsed.skipped, 0);

        assert!(parse("  \n").snapshots.is_empty());
    }

    #[test]
    fn test_empty_array() {
        assert!(parse("[]").snapshots.is_empty());
    }

    #[test]
    fn test_header_only() {
        let parsed = parse(r#"[["timestamp", "original", "mimetype", "statuscode"]]"#);
        assert!(parsed.snapshots.is_empty());
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let body = r#"[
            ["timestamp", "original", "mimetype", "statuscode"],
            ["20200305142233", "https://example.com/", "text/html", "200"],
            ["2020030514", "https://example.com/", "text/html", "200"],
            ["2020O305142233", "https://example.com/", "text/html", "200"],
            ["20200305142233", "https://example.com/", "text/html"],
            ["20200305142233", "https://example.com/", "text/html", "200", "extra"],
            [20200305142233, "https://example.com/", "text/html", "200"],
            ["20200306000000", "", "text/html", "200"],
            ["20200307000000", "https://example.com/", "text/html", "404"],
            "not a row",
            ["20210101000000", "https://example.com/", "text/html", "200"]
        ]"#;

        let parsed = parse(body);
        assert_eq!(parsed.snapshots.len(), 2);
        assert_eq!(parsed.skipped, 8);
    }

    #[test]
    fn test_invalid_json() {
        let result = parse_rows(b"<html>busy</html>", &ArchiveRoot::default(), RenderMode::Iframe);
        assert!(matches!(result, Err(IndexError::InvalidResponse(_))));
    }

    #[test]
    fn test_not_an_array() {
        let result = parse_rows(br#"{"error": "nope"}"#, &ArchiveRoot::default(), RenderMode::Iframe);
        assert!(matches!(result, Err(IndexError::InvalidResponse(_))));
    }
}
