// File: httpinner.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::error::{ScanError, ScanResult};
use reqwest::header::HeaderMap;

/// A fully read response, kept for comparison between requests.
#[derive(Debug, Clone)]
pub struct HttpInner {
    body: String,
    headers: HeaderMap,
    status: u16,
    reason: String,
    version: String,
    url: String,
}

impl HttpInner {
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Status line as `200 OK`.
    pub fn status_line(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_http2(&self) -> bool {
        self.version == "HTTP/2.0"
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn new_with_all(
        headers: HeaderMap,
        body: String,
        status: u16,
        version: String,
        url: String,
    ) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
            .to_string();
        HttpInner {
            body,
            headers,
            status,
            reason,
            version,
            url,
        }
    }

    /// Reads the whole body. A failed read is an error, never an empty body.
    pub async fn capture(response: reqwest::Response) -> ScanResult<Self> {
        let status = response.status().as_u16();
        let version = format!("{:?}", response.version());
        let url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(ScanError::BodyRead)?;

        Ok(Self::new_with_all(headers, body, status, version, url))
    }
}
