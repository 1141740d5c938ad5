// File: probe.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::cache_detector;
use crate::cachebuster;
use crate::checks::Check;
use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::reflection::{self, ReflectionSite};
use async_trait::async_trait;
use log::{debug, trace};
use std::sync::Arc;

#[derive(Debug)]
pub enum ProbeStatus {
    Reflected(ReflectionSite),
    NotReflected,
    /// No cache indicator header; the matcher was skipped.
    Uncached,
    Errored(ScanError),
}

#[derive(Debug)]
pub struct ProbeOutcome {
    check: Arc<Check>,
    requested_url: Option<String>,
    status: ProbeStatus,
}

impl ProbeOutcome {
    pub fn new(check: Arc<Check>, requested_url: Option<String>, status: ProbeStatus) -> Self {
        ProbeOutcome {
            check,
            requested_url,
            status,
        }
    }

    pub fn check(&self) -> &Check {
        &self.check
    }

    pub fn requested_url(&self) -> Option<&str> {
        self.requested_url.as_deref()
    }

    pub fn status(&self) -> &ProbeStatus {
        &self.status
    }

    pub fn reflected(&self) -> bool {
        matches!(self.status, ProbeStatus::Reflected(_))
    }

    pub fn error(&self) -> Option<&ScanError> {
        match &self.status {
            ProbeStatus::Errored(e) => Some(e),
            _ => None,
        }
    }
}

/// Runs a single check against the target. Implementations must never fail
/// the whole run; every problem ends up in the outcome.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, check: Arc<Check>) -> ProbeOutcome;
}

pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(config: &ScanConfig) -> ScanResult<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| ScanError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpProbe { client })
    }

    async fn evaluate(&self, url: &str, check: &Check) -> ScanResult<ProbeStatus> {
        if let Some(name) = check.unsendable_header() {
            return Err(ScanError::UnsendableHeader(name.to_string()));
        }
        let headers = check.header_map()?;

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(ScanError::Transport)?;

        trace!("{} -> {} for {}", url, response.status(), check.label());

        let signals = cache_detector::cache_signals(response.headers());
        if signals.is_empty() {
            debug!("No cache signal for {}", check.label());
            return Ok(ProbeStatus::Uncached);
        }
        debug!("Cache signals {:?} for {}", signals, check.label());

        match reflection::find_reflection(response, check.marker()).await? {
            Some(site) => Ok(ProbeStatus::Reflected(site)),
            None => Ok(ProbeStatus::NotReflected),
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, check: Arc<Check>) -> ProbeOutcome {
        let url = match cachebuster::bust(check.target()) {
            Ok(url) => url,
            Err(e) => return ProbeOutcome::new(check, None, ProbeStatus::Errored(e)),
        };

        let status = match self.evaluate(&url, &check).await {
            Ok(status) => status,
            Err(e) => ProbeStatus::Errored(e),
        };

        ProbeOutcome::new(check, Some(url), status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn check_for(target: &str, name: &str, value: &str, marker: &str) -> Arc<Check> {
        Arc::new(Check::new(
            target,
            vec![(name.to_string(), value.to_string())],
            marker,
        ))
    }

    fn probe_for(target: &str) -> HttpProbe {
        let mut config = ScanConfig::with_target(target);
        config.set_timeout(5);
        config.set_connect_timeout(2);
        HttpProbe::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_reflected_in_body_behind_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("x-forwarded-host", "terajari.me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("X-Cache", "HIT")
                    .set_body_string("<link href=\"//terajari.me/app.css\">"),
            )
            .mount(&server)
            .await;

        let probe = probe_for(&server.uri());
        let check = check_for(&server.uri(), "X-Forwarded-Host", "terajari.me", "terajari.me");
        let outcome = probe.probe(check).await;

        assert!(outcome.reflected());
        assert!(outcome.error().is_none());
        assert!(matches!(
            outcome.status(),
            ProbeStatus::Reflected(ReflectionSite::Body)
        ));
        assert!(outcome.requested_url().unwrap().contains("cachebuster="));
    }

    #[tokio::test]
    async fn test_uncached_response_skips_matcher() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("terajari.me"))
            .mount(&server)
            .await;

        let probe = probe_for(&server.uri());
        let check = check_for(&server.uri(), "X-Host", "terajari.me", "terajari.me");
        let outcome = probe.probe(check).await;

        assert!(!outcome.reflected());
        assert!(matches!(outcome.status(), ProbeStatus::Uncached));
    }

    #[tokio::test]
    async fn test_cached_without_reflection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("cf-cache-status", "MISS")
                    .set_body_string("hello"),
            )
            .mount(&server)
            .await;

        let probe = probe_for(&server.uri());
        let check = check_for(&server.uri(), "X-Host", "terajari.me", "terajari.me");
        let outcome = probe.probe(check).await;

        assert!(matches!(outcome.status(), ProbeStatus::NotReflected));
    }

    #[tokio::test]
    async fn test_redirects_are_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param_is_missing("followed"))
            .respond_with(
                ResponseTemplate::new(302)
                    .append_header("x-cache", "HIT")
                    .append_header("location", "https://terajari.me/?followed=1"),
            )
            .mount(&server)
            .await;

        let probe = probe_for(&server.uri());
        let check = check_for(&server.uri(), "X-Forwarded-Host", "terajari.me", "terajari.me");
        let outcome = probe.probe(check).await;

        assert!(matches!(
            outcome.status(),
            ProbeStatus::Reflected(ReflectionSite::Header(ref name)) if name == "location"
        ));
    }

    #[tokio::test]
    async fn test_check_user_agent_overrides_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "terajari.me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("x-cache", "HIT")
                    .set_body_string("ua=terajari.me"),
            )
            .mount(&server)
            .await;

        let probe = probe_for(&server.uri());
        let check = check_for(&server.uri(), "User-Agent", "terajari.me", "terajari.me");
        let outcome = probe.probe(check).await;

        assert!(outcome.reflected());
    }

    #[tokio::test]
    async fn test_malformed_target_is_errored() {
        let probe = probe_for("https://example.com");
        let check = check_for("::not-a-url::", "X-Host", "terajari.me", "terajari.me");
        let outcome = probe.probe(check).await;

        assert!(!outcome.reflected());
        assert!(matches!(
            outcome.error(),
            Some(ScanError::MalformedUrl { .. })
        ));
        assert!(outcome.requested_url().is_none());
    }

    /// Accepts one connection, stores the raw request head and answers with
    /// `response` before closing.
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let target = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut head = Vec::new();
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&head).to_lowercase()
        });
        (target, handle)
    }

    #[tokio::test]
    async fn test_truncated_body_is_body_read_error() {
        let (target, server) = serve_once(
            "HTTP/1.1 200 OK\r\nX-Cache: HIT\r\nContent-Length: 100\r\n\r\nhello",
        )
        .await;

        let probe = probe_for(&target);
        let check = check_for(&target, "X-Host", "terajari.me", "terajari.me");
        let outcome = probe.probe(check).await;
        server.await.unwrap();

        assert!(!outcome.reflected());
        assert!(matches!(
            outcome.status(),
            ProbeStatus::Errored(ScanError::BodyRead(_))
        ));
    }

    #[tokio::test]
    async fn test_trailer_header_reaches_the_wire() {
        let (target, server) =
            serve_once("HTTP/1.1 200 OK\r\nX-Cache: HIT\r\nContent-Length: 0\r\n\r\n").await;

        let probe = probe_for(&target);
        let check = check_for(&target, "Trailer", "terajari.me", "terajari.me");
        let outcome = probe.probe(check).await;
        let request = server.await.unwrap();

        assert!(request.contains("trailer: terajari.me"));
        assert!(matches!(outcome.status(), ProbeStatus::NotReflected));
    }

    #[tokio::test]
    async fn test_transfer_encoding_check_is_errored_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("x-cache", "HIT")
                    .set_body_string("clean"),
            )
            .mount(&server)
            .await;

        let probe = probe_for(&server.uri());
        let check = check_for(&server.uri(), "Transfer-Encoding", "terajari.me", "terajari.me");
        let outcome = probe.probe(check).await;

        assert!(!outcome.reflected());
        assert!(matches!(
            outcome.error(),
            Some(ScanError::UnsendableHeader(ref name)) if name == "Transfer-Encoding"
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let target = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let probe = probe_for(&target);
        let check = check_for(&target, "X-Host", "terajari.me", "terajari.me");
        let outcome = probe.probe(check).await;

        assert!(matches!(outcome.error(), Some(ScanError::Transport(_))));
        assert!(!outcome.reflected());
    }
}
