// File: checks.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::error::{ScanError, ScanResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

pub const DEFAULT_MARKER: &str = "terajari.me";
pub const PORT_MARKER: &str = ":13377";

/// Message framing headers the HTTP client strips from a GET without a body.
const BODY_FRAMING_HEADERS: &[&str] = &["transfer-encoding"];

/// One catalogue entry: the headers to inject and the marker that proves
/// they were reflected.
struct Vector {
    headers: &'static [(&'static str, &'static str)],
    marker: &'static str,
}

#[rustfmt::skip]
static VECTORS: &[Vector] = &[
    // forwarded host / client spoofing
    Vector { headers: &[("X-Forwarded-Host", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("X-Forwarded-For", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("X-Forwarded-Prefix", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("X-Forwarded-Server", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("X-Host", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("X-Original-Host", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    // url rewriting
    Vector { headers: &[("X-Rewrite-Url", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("X-Original-Url", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    // cache key bypass through rewritten ports
    Vector { headers: &[("X-Forwarded-Proto", "13377")], marker: PORT_MARKER },
    Vector { headers: &[("X-Forwarded-Port", "13377")], marker: PORT_MARKER },
    // CDN vendors
    Vector { headers: &[("Fastly-Ssl", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("Fastly-Host", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("Fastly-Ff", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("Fastly-Client-Ip", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("True-Client-Ip", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("Akamai-Origin-Hop", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("X-Amz-Server-Side-Encryption", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("X-Amz-Website-Redirect-Location", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    // protocol abuse and malformed host spellings
    Vector { headers: &[("Transfer-Encoding", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("Trailer", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("H0st", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    // request headers commonly echoed by origins
    Vector { headers: &[("User-Agent", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("Origin", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("Handle", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("Content-Type", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("Api-Version", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("Accept-Version", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    Vector { headers: &[("Acunetix-Header", DEFAULT_MARKER)], marker: DEFAULT_MARKER },
    // combinations
    Vector {
        headers: &[("X-Forwarded-Host", DEFAULT_MARKER), ("X-Forwarded-Scheme", "http")],
        marker: DEFAULT_MARKER,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    target: String,
    headers: Vec<(String, String)>,
    marker: String,
}

impl Check {
    pub fn new(
        target: impl Into<String>,
        headers: Vec<(String, String)>,
        marker: impl Into<String>,
    ) -> Self {
        Check {
            target: target.into(),
            headers,
            marker: marker.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Injected headers as `Name: value, Name: value`.
    pub fn label(&self) -> String {
        self.headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// First injected header the client would drop before sending.
    pub fn unsendable_header(&self) -> Option<&str> {
        self.headers
            .iter()
            .map(|(name, _)| name.as_str())
            .find(|name| {
                BODY_FRAMING_HEADERS
                    .iter()
                    .any(|h| h.eq_ignore_ascii_case(name))
            })
    }

    /// Builds the header map to send. The first value of a name replaces
    /// whatever the client would set by default; later values for the same
    /// name are appended.
    pub fn header_map(&self) -> ScanResult<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ScanError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| ScanError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            if map.contains_key(&header_name) {
                map.append(header_name, header_value);
            } else {
                map.insert(header_name, header_value);
            }
        }
        Ok(map)
    }
}

/// The fixed check battery, bound to `target`.
pub fn catalogue(target: &str) -> Vec<Check> {
    VECTORS
        .iter()
        .map(|vector| {
            Check::new(
                target,
                vector
                    .headers
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
                vector.marker,
            )
        })
        .collect()
}
