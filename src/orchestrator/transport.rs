//! HTTP transport used by the orchestrator.
//!
//! The orchestrator only needs "POST this JSON, give me status and body",
//! so that is all the trait exposes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Raw reply from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    /// Canonical reason phrase, empty when unknown.
    pub reason: String,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` as JSON to `url`.
    ///
    /// Returns `Err` only when no response could be obtained; the message
    /// is shown to the user as-is.
    async fn post_json(&self, url: &str, body: &Value) -> std::result::Result<HttpReply, String>;
}

/// Transport backed by a shared `reqwest` client.
pub struct HttpTransport {
    client: reqwest::Client,
    timeout_seconds: u64,
}

impl HttpTransport {
    pub fn new(timeout_seconds: u64, accept_json: bool) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if accept_json {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            timeout_seconds,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> std::result::Result<HttpReply, String> {
        debug!("POST {}", url);

        // `.json()` sets Content-Type: application/json.
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    format!("Request timed out after {}s", self.timeout_seconds)
                } else if e.is_connect() {
                    format!("Cannot connect to {}", url)
                } else {
                    format!("Failed to send request: {}", e)
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response body: {}", e))?;

        debug!("POST {} -> {}", url, status);

        Ok(HttpReply {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
