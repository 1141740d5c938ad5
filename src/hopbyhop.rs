// File: hopbyhop.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::error::{ScanError, ScanResult};
use crate::httpinner::HttpInner;
use log::{debug, warn};
use once_cell::sync::Lazy;
use reqwest::header::{HeaderMap, CONNECTION, USER_AGENT};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Headers that legitimately change between two requests.
static VOLATILE_HEADERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "date",
        "expires",
        "last-modified",
        "x-request-id",
        "set-cookie",
        "cache-control",
        "connection",
        "cf-ray",
        "age",
    ]
    .into_iter()
    .collect()
});

pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderDifference {
    Missing(String),
    CountChanged {
        name: String,
        before: usize,
        after: usize,
    },
    ValueChanged {
        name: String,
        before: String,
        after: String,
    },
    Added(String),
}

impl fmt::Display for HeaderDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "Header '{}' missing in new response", name),
            Self::CountChanged {
                name,
                before,
                after,
            } => write!(
                f,
                "Header '{}' value count changed ({} → {})",
                name, before, after
            ),
            Self::ValueChanged {
                name,
                before,
                after,
            } => write!(
                f,
                "Header '{}' value changed: '{}' → '{}'",
                name, before, after
            ),
            Self::Added(name) => write!(f, "New header '{}' appeared", name),
        }
    }
}

fn header_values(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .get_all(name)
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
        .collect()
}

/// Differences between two header sets, ignoring volatile headers.
pub fn compare_headers(original: &HeaderMap, new: &HeaderMap) -> Vec<HeaderDifference> {
    let mut differences = Vec::new();

    for name in original.keys() {
        let key = name.as_str();
        if VOLATILE_HEADERS.contains(key) {
            continue;
        }

        if !new.contains_key(name) {
            differences.push(HeaderDifference::Missing(key.to_string()));
            continue;
        }

        let before = header_values(original, key);
        let after = header_values(new, key);
        if before.len() != after.len() {
            differences.push(HeaderDifference::CountChanged {
                name: key.to_string(),
                before: before.len(),
                after: after.len(),
            });
            continue;
        }

        for (old, fresh) in before.into_iter().zip(after) {
            if old != fresh {
                differences.push(HeaderDifference::ValueChanged {
                    name: key.to_string(),
                    before: old,
                    after: fresh,
                });
            }
        }
    }

    for name in new.keys() {
        if VOLATILE_HEADERS.contains(name.as_str()) {
            continue;
        }
        if !original.contains_key(name) {
            differences.push(HeaderDifference::Added(name.as_str().to_string()));
        }
    }

    differences
}

#[derive(Debug)]
pub enum HopOutcome {
    /// HTTP/2 forbids connection-specific headers outside the hop-by-hop set.
    Skipped,
    Compared {
        status_before: String,
        status_after: String,
        body_before: usize,
        body_after: usize,
        body_changed: bool,
        headers: Vec<HeaderDifference>,
    },
    Errored(ScanError),
}

#[derive(Debug)]
pub struct HopReport {
    pub header: String,
    pub outcome: HopOutcome,
}

impl HopReport {
    pub fn status_changed(&self) -> bool {
        matches!(&self.outcome, HopOutcome::Compared { status_before, status_after, .. } if status_before != status_after)
    }

    pub fn changed(&self) -> bool {
        match &self.outcome {
            HopOutcome::Compared {
                status_before,
                status_after,
                body_changed,
                headers,
                ..
            } => status_before != status_after || *body_changed || !headers.is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct HopByHopScan {
    pub baseline: HttpInner,
    pub reports: Vec<HopReport>,
}

pub struct HopByHopProbe {
    client: reqwest::Client,
}

impl HopByHopProbe {
    pub fn new(timeout: Duration) -> ScanResult<Self> {
        let client = reqwest::Client::builder()
            .http1_only()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .connect_timeout(timeout)
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| ScanError::Configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(HopByHopProbe { client })
    }

    async fn fetch(&self, url: &str, connection: &str) -> ScanResult<HttpInner> {
        let response = self
            .client
            .get(url)
            .header(CONNECTION, connection)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(ScanError::Transport)?;
        HttpInner::capture(response).await
    }

    /// Baseline first, then one request per baseline header name with that
    /// name listed in `Connection`. Runs sequentially.
    pub async fn run(&self, url: &str) -> ScanResult<HopByHopScan> {
        let baseline = self.fetch(url, "close").await?;
        debug!(
            "Baseline {} {} with {} headers",
            baseline.version(),
            baseline.status(),
            baseline.headers().len()
        );

        let names: Vec<String> = baseline
            .headers()
            .keys()
            .map(|name| name.as_str().to_string())
            .collect();

        let mut reports = Vec::with_capacity(names.len());
        for name in names {
            let outcome = if baseline.is_http2() && !is_hop_by_hop(&name) {
                HopOutcome::Skipped
            } else {
                match self.fetch(url, &name).await {
                    Ok(response) => HopOutcome::Compared {
                        status_before: baseline.status_line(),
                        status_after: response.status_line(),
                        body_before: baseline.body().len(),
                        body_after: response.body().len(),
                        body_changed: baseline.body() != response.body(),
                        headers: compare_headers(baseline.headers(), response.headers()),
                    },
                    Err(e) => {
                        warn!("Hop-by-hop request for '{}' failed: {}", name, e);
                        HopOutcome::Errored(e)
                    }
                }
            };
            reports.push(HopReport {
                header: name,
                outcome,
            });
        }

        Ok(HopByHopScan { baseline, reports })
    }
}
