// File: dispatcher.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::aggregator::ResultAggregator;
use crate::checks::Check;
use crate::error::ScanError;
use crate::probe::{Probe, ProbeOutcome, ProbeStatus};
use crate::report;
use futures::FutureExt;
use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};
use indicatif::ProgressBar;
use log::{debug, info, warn};
use std::num::NonZeroU32;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

type SharedLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Fixed pool of workers draining one bounded queue of checks.
pub struct Dispatcher {
    workers: usize,
    rate_limiter: Option<SharedLimiter>,
    progress: Option<ProgressBar>,
}

impl Dispatcher {
    pub fn new(workers: usize) -> Self {
        Dispatcher {
            workers: workers.max(1),
            rate_limiter: None,
            progress: None,
        }
    }

    /// Caps probe starts across all workers.
    pub fn with_rate_limit(mut self, per_second: NonZeroU32) -> Self {
        self.rate_limiter = Some(Arc::new(RateLimiter::direct(Quota::per_second(per_second))));
        self
    }

    /// Prints one line per outcome above the bar and advances it.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Enqueues every check once, closes the queue and returns only after
    /// every worker has exited.
    pub async fn run<P>(&self, probe: Arc<P>, checks: Vec<Check>, aggregator: Arc<ResultAggregator>)
    where
        P: Probe + 'static,
    {
        let total = checks.len();
        let (tx, rx) = mpsc::channel::<Arc<Check>>(self.workers);
        let rx = Arc::new(Mutex::new(rx));

        info!("Dispatching {} checks to {} workers", total, self.workers);

        let mut handles = Vec::with_capacity(self.workers);
        for id in 0..self.workers {
            let rx = Arc::clone(&rx);
            let probe = Arc::clone(&probe);
            let aggregator = Arc::clone(&aggregator);
            let rate_limiter = self.rate_limiter.clone();
            let progress = self.progress.clone();

            handles.push(tokio::spawn(async move {
                let mut processed = 0usize;
                loop {
                    let next = rx.lock().await.recv().await;
                    let Some(check) = next else { break };

                    if let Some(limiter) = &rate_limiter {
                        limiter.until_ready().await;
                    }

                    let label = check.label();
                    let outcome = match AssertUnwindSafe(probe.probe(Arc::clone(&check)))
                        .catch_unwind()
                        .await
                    {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            warn!("Worker {} panicked on {}", id, label);
                            ProbeOutcome::new(
                                check,
                                None,
                                ProbeStatus::Errored(ScanError::Panicked(label)),
                            )
                        }
                    };

                    if let Some(pb) = &progress {
                        let line = report::format_outcome(&outcome);
                        pb.suspend(|| println!("{}", line));
                        pb.inc(1);
                    }

                    aggregator.record(&outcome).await;
                    processed += 1;
                }
                debug!("Worker {} drained queue after {} checks", id, processed);
            }));
        }

        for check in checks {
            if tx.send(Arc::new(check)).await.is_err() {
                warn!("All workers exited before the queue was filled");
                break;
            }
        }
        drop(tx);

        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                warn!("Worker task failed: {}", e);
            }
        }

        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }
        info!("All {} workers joined", self.workers);
    }
}
