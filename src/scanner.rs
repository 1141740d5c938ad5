// File: scanner.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::aggregator::{AggregateResult, ResultAggregator};
use crate::checks::{self, Check};
use crate::config::ScanConfig;
use crate::dispatcher::Dispatcher;
use crate::error::ScanResult;
use crate::probe::{HttpProbe, Probe};
use indicatif::ProgressBar;
use log::{info, warn};
use std::sync::Arc;

/// One cache-poisoning run against a single target.
pub struct Scanner<P: Probe + 'static = HttpProbe> {
    config: ScanConfig,
    probe: Arc<P>,
    progress: Option<ProgressBar>,
}

impl Scanner<HttpProbe> {
    /// Validates `config` and builds the shared HTTP client. Nothing is sent
    /// until `run`.
    pub fn new(config: ScanConfig) -> ScanResult<Self> {
        config.validate()?;
        let probe = HttpProbe::new(&config)?;
        Ok(Scanner {
            config,
            probe: Arc::new(probe),
            progress: None,
        })
    }
}

impl<P: Probe + 'static> Scanner<P> {
    pub fn with_probe(config: ScanConfig, probe: P) -> ScanResult<Self> {
        config.validate()?;
        Ok(Scanner {
            config,
            probe: Arc::new(probe),
            progress: None,
        })
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn checks(&self) -> Vec<Check> {
        checks::catalogue(self.config.target_url().trim())
    }

    pub async fn run(&self) -> AggregateResult {
        let checks = self.checks();
        if let Some(pb) = &self.progress {
            pb.set_length(checks.len() as u64);
        }

        let aggregator = Arc::new(ResultAggregator::new(self.config.target_url().trim()));

        let mut dispatcher = Dispatcher::new(self.config.workers());
        if let Some(rate) = self.config.rate_limit() {
            dispatcher = dispatcher.with_rate_limit(rate);
        }
        if let Some(pb) = &self.progress {
            dispatcher = dispatcher.with_progress(pb.clone());
        }

        dispatcher
            .run(Arc::clone(&self.probe), checks, Arc::clone(&aggregator))
            .await;

        let result = aggregator.finalize().await;

        if result.all_errored() {
            warn!(
                "Every check against {} failed; the verdict does not reflect the target",
                result.target
            );
        }
        info!(
            "Scan of {} finished: {} reflections, {} errors, verdict {}",
            result.target, result.reflections, result.errored, result.verdict
        );

        result
    }
}
