// File: cache_detector.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use once_cell::sync::Lazy;
use reqwest::header::HeaderMap;
use std::collections::HashSet;

/// Header names whose presence shows a cache or CDN answered. Stored
/// lowercase.
static CACHE_INDICATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "x-cache",
        "cf-cache-status",
        "x-drupal-cache",
        "x-varnish-cache",
        "akamai-cache-status",
        "server-timing",
        "x-iinfo",
        "x-nc",
        "x-hs-cf-cache-status",
        "x-proxy-cache",
        "x-cache-hits",
        "x-cache-status",
        "x-cache-info",
        "x-rack-cache",
        "cdn_cache_status",
        "x-akamai-cache",
        "x-akamai-cache-remote",
        "x-cache-remote",
        "x-ac",
    ]
    .into_iter()
    .collect()
});

pub fn is_cache_indicator(name: &str) -> bool {
    CACHE_INDICATORS.contains(name.to_ascii_lowercase().as_str())
}

pub fn has_cache_signal(headers: &HeaderMap) -> bool {
    headers.keys().any(|name| is_cache_indicator(name.as_str()))
}

/// Names of the indicator headers present in `headers`.
pub fn cache_signals(headers: &HeaderMap) -> Vec<String> {
    headers
        .keys()
        .filter(|name| is_cache_indicator(name.as_str()))
        .map(|name| name.as_str().to_string())
        .collect()
}
