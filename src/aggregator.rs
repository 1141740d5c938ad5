// File: aggregator.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::probe::{ProbeOutcome, ProbeStatus};
use crate::reflection::ReflectionSite;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Vulnerable,
    Secure,
}

impl Verdict {
    pub fn from_reflections(reflections: usize) -> Self {
        if reflections > 0 {
            Verdict::Vulnerable
        } else {
            Verdict::Secure
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Vulnerable => write!(f, "VULNERABLE"),
            Verdict::Secure => write!(f, "SECURE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Reflected,
    NotReflected,
    Uncached,
    Errored,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckRecord {
    pub headers: String,
    pub marker: String,
    pub url: Option<String>,
    pub kind: OutcomeKind,
    pub site: Option<ReflectionSite>,
    pub error: Option<String>,
}

impl CheckRecord {
    fn from_outcome(outcome: &ProbeOutcome) -> Self {
        let (kind, site, error) = match outcome.status() {
            ProbeStatus::Reflected(site) => (OutcomeKind::Reflected, Some(site.clone()), None),
            ProbeStatus::NotReflected => (OutcomeKind::NotReflected, None, None),
            ProbeStatus::Uncached => (OutcomeKind::Uncached, None, None),
            ProbeStatus::Errored(e) => (OutcomeKind::Errored, None, Some(e.to_string())),
        };

        CheckRecord {
            headers: outcome.check().label(),
            marker: outcome.check().marker().to_string(),
            url: outcome.requested_url().map(str::to_string),
            kind,
            site,
            error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    pub target: String,
    pub total_checks: usize,
    pub reflections: usize,
    pub not_reflected: usize,
    pub uncached: usize,
    pub errored: usize,
    pub verdict: Verdict,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// In completion order.
    pub records: Vec<CheckRecord>,
}

impl AggregateResult {
    pub fn findings(&self) -> impl Iterator<Item = &CheckRecord> {
        self.records
            .iter()
            .filter(|r| r.kind == OutcomeKind::Reflected)
    }

    /// Checks that got an answer from the target, reflected or not.
    pub fn evaluated(&self) -> usize {
        self.total_checks - self.errored
    }

    /// True when no check reached the target, so a SECURE verdict says
    /// nothing about the target.
    pub fn all_errored(&self) -> bool {
        self.total_checks > 0 && self.errored == self.total_checks
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

#[derive(Debug)]
struct AggregateState {
    reflections: usize,
    not_reflected: usize,
    uncached: usize,
    errored: usize,
    records: Vec<CheckRecord>,
}

/// Shared by every worker. `record` is the only operation that may run
/// concurrently; `finalize` must wait until all workers have joined.
#[derive(Debug)]
pub struct ResultAggregator {
    target: String,
    started_at: DateTime<Utc>,
    state: Mutex<AggregateState>,
}

impl ResultAggregator {
    pub fn new(target: impl Into<String>) -> Self {
        ResultAggregator {
            target: target.into(),
            started_at: Utc::now(),
            state: Mutex::new(AggregateState {
                reflections: 0,
                not_reflected: 0,
                uncached: 0,
                errored: 0,
                records: Vec::new(),
            }),
        }
    }

    pub async fn record(&self, outcome: &ProbeOutcome) {
        let record = CheckRecord::from_outcome(outcome);

        let mut state = self.state.lock().await;
        match record.kind {
            OutcomeKind::Reflected => state.reflections += 1,
            OutcomeKind::NotReflected => state.not_reflected += 1,
            OutcomeKind::Uncached => state.uncached += 1,
            OutcomeKind::Errored => state.errored += 1,
        }
        state.records.push(record);
    }

    pub async fn reflections(&self) -> usize {
        self.state.lock().await.reflections
    }

    pub async fn finalize(self: Arc<Self>) -> AggregateResult {
        let finished_at = Utc::now();
        match Arc::try_unwrap(self) {
            Ok(aggregator) => {
                let state = aggregator.state.into_inner();
                Self::build(aggregator.target, aggregator.started_at, finished_at, state)
            }
            Err(shared) => {
                let state = shared.state.lock().await;
                let snapshot = AggregateState {
                    reflections: state.reflections,
                    not_reflected: state.not_reflected,
                    uncached: state.uncached,
                    errored: state.errored,
                    records: state.records.clone(),
                };
                Self::build(shared.target.clone(), shared.started_at, finished_at, snapshot)
            }
        }
    }

    fn build(
        target: String,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        state: AggregateState,
    ) -> AggregateResult {
        AggregateResult {
            target,
            total_checks: state.records.len(),
            reflections: state.reflections,
            not_reflected: state.not_reflected,
            uncached: state.uncached,
            errored: state.errored,
            verdict: Verdict::from_reflections(state.reflections),
            started_at,
            finished_at,
            records: state.records,
        }
    }
}
