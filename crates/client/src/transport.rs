//! HTTP transport seam.
//!
//! The index client and insight gateway only speak to [`Transport`], so
//! tests can substitute a scripted transport and the production build uses
//! [`ReqwestTransport`]. Deadlines are enforced by callers by cancelling the
//! `execute` future, not by the transport itself.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, header};

/// HTTP verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Outbound request description.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub json: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: Method::Get, url: url.into(), query: Vec::new(), headers: Vec::new(), json: None }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self { method: Method::Post, url: url.into(), query: Vec::new(), headers: Vec::new(), json: Some(body) }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// First query value for `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// First header value for `key` (case-insensitive).
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Failures below the HTTP status level.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { TransportError::Timeout } else { TransportError::Network(err.to_string()) }
    }
}

/// Executes outbound HTTP requests.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Build a client with rustls and transparent decompression.
    pub fn new(user_agent: &str) -> Result<Self, TransportError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.http.get(&request.url),
            Method::Post => self.http.post(&request.url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.json {
            builder = builder.header(header::CONTENT_TYPE, "application/json").json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        tracing::debug!(url = %request.url, status, bytes = body.len(), "http exchange complete");

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let req = HttpRequest::get("https://archive.example/cdx")
            .query("url", "example.com")
            .query("output", "json")
            .header("Accept", "application/json");

        assert_eq!(req.method, Method::Get);
        assert_eq!(req.query_value("url"), Some("example.com"));
        assert_eq!(req.query_value("missing"), None);
        assert_eq!(req.header_value("accept"), Some("application/json"));
        assert!(req.json.is_none());
    }

    #[test]
    fn test_post_json() {
        let req = HttpRequest::post_json("https://llm.example/v1", serde_json::json!({"model": "m"}));
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.json.unwrap()["model"], "m");
    }

    #[test]
    fn test_response_helpers() {
        let ok = HttpResponse::new(204, "");
        assert!(ok.is_success());

        let err = HttpResponse::new(503, "upstream \u{fffd} down");
        assert!(!err.is_success());
        assert!(err.text().contains("down"));
    }

    #[test]
    fn test_reqwest_transport_new() {
        assert!(ReqwestTransport::new("wayback-rewind/0.1").is_ok());
    }
}
