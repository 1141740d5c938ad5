// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::error::{ScanError, ScanResult};
use std::num::NonZeroU32;
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 12_2_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36";

const WORKERS_PER_CORE: usize = 5;

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        * WORKERS_PER_CORE
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    target_url: String,
    user_agent: String,
    workers: usize,
    connect_timeout: u64,
    timeout: u64,
    rate_limit: Option<NonZeroU32>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self {
            target_url: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            workers: default_workers(),
            connect_timeout: 10,
            timeout: 15,
            rate_limit: None,
        }
    }

    pub fn with_target(target_url: impl Into<String>) -> Self {
        let mut config = Self::new();
        config.set_target_url(target_url);
        config
    }

    pub fn set_target_url(&mut self, target_url: impl Into<String>) {
        self.target_url = target_url.into();
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn set_workers(&mut self, workers: usize) {
        self.workers = workers;
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn set_connect_timeout(&mut self, connect_timeout: u64) {
        self.connect_timeout = connect_timeout;
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn set_timeout(&mut self, timeout: u64) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn set_rate_limit(&mut self, rate_limit: Option<NonZeroU32>) {
        self.rate_limit = rate_limit;
    }

    pub fn rate_limit(&self) -> Option<NonZeroU32> {
        self.rate_limit
    }

    /// Rejects settings that would make a run meaningless. Called before any
    /// network activity.
    pub fn validate(&self) -> ScanResult<()> {
        let target = self.target_url.trim();
        if target.is_empty() {
            return Err(ScanError::Configuration(
                "URL parameter required".to_string(),
            ));
        }

        let parsed = Url::parse(target)
            .map_err(|e| ScanError::Configuration(format!("invalid target URL '{}': {}", target, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ScanError::Configuration(format!(
                "unsupported scheme '{}', expected http or https",
                parsed.scheme()
            )));
        }

        if parsed.host_str().is_none() {
            return Err(ScanError::Configuration(format!(
                "target URL '{}' has no host",
                target
            )));
        }

        if self.workers == 0 {
            return Err(ScanError::Configuration(
                "worker count must be at least 1".to_string(),
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ScanError::Configuration(
                "user agent must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
