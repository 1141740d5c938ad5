// File: error.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Malformed URL '{url}': {source}")]
    MalformedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Header '{0}' cannot be sent on a request without a body")]
    UnsendableHeader(String),

    #[error("Check '{0}' panicked")]
    Panicked(String),

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Body read error: {0}")]
    BodyRead(#[source] reqwest::Error),
}

impl ScanError {
    /// Short stable name used in records and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::MalformedUrl { .. } => "malformed_url",
            Self::InvalidHeader { .. } => "invalid_header",
            Self::UnsendableHeader(_) => "unsendable_header",
            Self::Panicked(_) => "panicked",
            Self::Transport(_) => "transport",
            Self::BodyRead(_) => "body_read",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
