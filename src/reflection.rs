// File: reflection.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::error::{ScanError, ScanResult};
use log::trace;
use reqwest::header::HeaderMap;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "site", content = "header", rename_all = "snake_case")]
pub enum ReflectionSite {
    Header(String),
    Body,
}

impl fmt::Display for ReflectionSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(name) => write!(f, "header {}", name),
            Self::Body => write!(f, "body"),
        }
    }
}

/// Name of the first header whose value contains `marker`.
pub fn reflected_in_headers(headers: &HeaderMap, marker: &str) -> Option<String> {
    if marker.is_empty() {
        return None;
    }
    headers
        .iter()
        .find(|(_, value)| String::from_utf8_lossy(value.as_bytes()).contains(marker))
        .map(|(name, _)| name.as_str().to_string())
}

pub fn reflected_in_body(body: &str, marker: &str) -> bool {
    !marker.is_empty() && body.contains(marker)
}

/// Header values are scanned first; the body is only read when no header
/// carries the marker.
pub async fn find_reflection(
    response: reqwest::Response,
    marker: &str,
) -> ScanResult<Option<ReflectionSite>> {
    if let Some(name) = reflected_in_headers(response.headers(), marker) {
        trace!("Marker '{}' reflected in header {}", marker, name);
        return Ok(Some(ReflectionSite::Header(name)));
    }

    let body = response.text().await.map_err(ScanError::BodyRead)?;
    if reflected_in_body(&body, marker) {
        trace!("Marker '{}' reflected in body", marker);
        return Ok(Some(ReflectionSite::Body));
    }

    Ok(None)
}
