// File: lib.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_inception)]
#![allow(clippy::bool_assert_comparison)]
#![allow(clippy::new_without_default)]

pub mod aggregator;
pub mod cache_detector;
pub mod cachebuster;
pub mod checks;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hopbyhop;
pub mod httpinner;
pub mod probe;
pub mod reflection;
pub mod report;
pub mod robots;
pub mod scanner;
