// File: cachebuster.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::error::{ScanError, ScanResult};
use rand::Rng;
use url::Url;

pub const CACHE_BUSTER_PARAM: &str = "cachebuster";

/// Values are drawn from `0..CACHE_BUSTER_BOUND`.
pub const CACHE_BUSTER_BOUND: u32 = 9999;

/// Returns `target` with a fresh `cachebuster` query parameter. An existing
/// `cachebuster` parameter is replaced by a different value; every other
/// parameter is kept in order.
pub fn bust(target: &str) -> ScanResult<String> {
    let mut url = Url::parse(target).map_err(|source| ScanError::MalformedUrl {
        url: target.to_string(),
        source,
    })?;

    let mut previous = None;
    let mut retained = Vec::new();
    for (key, value) in url.query_pairs() {
        if key == CACHE_BUSTER_PARAM {
            previous = Some(value.into_owned());
        } else {
            retained.push((key.into_owned(), value.into_owned()));
        }
    }

    let value = fresh_value(previous.as_deref());

    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(CACHE_BUSTER_PARAM, &value);

    Ok(url.into())
}

fn fresh_value(previous: Option<&str>) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let candidate = rng.gen_range(0..CACHE_BUSTER_BOUND).to_string();
        if previous != Some(candidate.as_str()) {
            return candidate;
        }
    }
}
