// File: common/mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(dead_code)]

use rpoison::config::ScanConfig;
use std::collections::HashMap;
use std::net::TcpListener;
use wiremock::{MockServer, ResponseTemplate};

pub const MARKER: &str = "terajari.me";

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn create_mock_response(status: u16, body: &str, headers: HashMap<&str, &str>) -> ResponseTemplate {
    let mut response = ResponseTemplate::new(status).set_body_string(body);
    for (key, value) in headers {
        response = response.append_header(key, value);
    }
    response
}

/// A response as served by a cache, carrying `X-Cache`.
pub fn cached_response(cache_status: &str, body: &str) -> ResponseTemplate {
    let mut headers = HashMap::new();
    headers.insert("x-cache", cache_status);
    headers.insert("content-type", "text/html");
    create_mock_response(200, body, headers)
}

pub fn uncached_response(body: &str) -> ResponseTemplate {
    let mut headers = HashMap::new();
    headers.insert("content-type", "text/html");
    create_mock_response(200, body, headers)
}

/// A local address nothing listens on.
pub fn unreachable_target() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/", addr)
}

pub fn scan_config(target: &str, workers: usize) -> ScanConfig {
    let mut config = ScanConfig::with_target(target);
    config.set_workers(workers);
    config.set_connect_timeout(2);
    config.set_timeout(5);
    config
}

pub fn sample_robots() -> String {
    "User-agent: *\nDisallow: /admin\nAllow: /public/\nDisallow: /*.php$\nDisallow:\nSitemap: /sitemap.xml\n"
        .to_string()
}
