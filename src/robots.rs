// File: robots.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::error::{ScanError, ScanResult};
use crate::httpinner::HttpInner;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(Allow|Disallow):(.*)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsEntry {
    pub directive: Directive,
    pub path: String,
    pub url: String,
}

impl RobotsEntry {
    /// Wildcard and anchor rules cannot be requested literally.
    pub fn is_pattern(&self) -> bool {
        self.path.contains(['*', '?', '$'])
    }
}

#[derive(Debug)]
pub enum PathStatus {
    Skipped,
    Status { code: u16, reason: String },
    Errored(ScanError),
}

#[derive(Debug)]
pub struct PathReport {
    pub entry: RobotsEntry,
    pub status: PathStatus,
}

pub fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

pub fn robots_url(base: &str) -> String {
    format!("{}/robots.txt", normalize_base(base))
}

/// `Allow:` and `Disallow:` lines in file order. Empty paths are dropped.
pub fn parse_robots(base: &str, data: &str) -> Vec<RobotsEntry> {
    let base = normalize_base(base);
    data.lines()
        .filter_map(|line| {
            let caps = DIRECTIVE.captures(line.trim_end_matches('\r'))?;
            let directive = match &caps[1] {
                "Allow" => Directive::Allow,
                _ => Directive::Disallow,
            };
            let path = caps[2].trim();
            if path.is_empty() {
                return None;
            }
            Some(RobotsEntry {
                directive,
                path: path.to_string(),
                url: format!("{}{}", base, path),
            })
        })
        .collect()
}

pub struct RobotsProbe {
    client: reqwest::Client,
}

impl RobotsProbe {
    pub fn new(timeout: Duration) -> ScanResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScanError::Configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(RobotsProbe { client })
    }

    pub async fn fetch(&self, base: &str) -> ScanResult<HttpInner> {
        let url = robots_url(base);
        info!("Fetching {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ScanError::Transport)?;
        HttpInner::capture(response).await
    }

    async fn check(&self, entry: &RobotsEntry) -> PathStatus {
        if entry.is_pattern() {
            return PathStatus::Skipped;
        }
        match self.client.head(&entry.url).send().await {
            Ok(response) => {
                let status = response.status();
                debug!("{} -> {}", entry.url, status);
                PathStatus::Status {
                    code: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("").to_string(),
                }
            }
            Err(e) => PathStatus::Errored(ScanError::Transport(e)),
        }
    }

    /// Fetches robots.txt and checks each listed path, one after another.
    pub async fn run(&self, base: &str) -> ScanResult<Vec<PathReport>> {
        let robots = self.fetch(base).await?;
        let entries = parse_robots(base, robots.body());
        info!("robots.txt lists {} paths", entries.len());

        let mut reports = Vec::with_capacity(entries.len());
        for entry in entries {
            let status = self.check(&entry).await;
            reports.push(PathReport { entry, status });
        }
        Ok(reports)
    }
}
