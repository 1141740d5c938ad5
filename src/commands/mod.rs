// File: mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::Result;
use colored::*;

use crate::cli::{HopByHopArgs, PoisonArgs, RobotsArgs};
use crate::config::ScanConfig;
use crate::error::ScanResult;

pub mod hopbyhop;
pub mod poison;
pub mod robots;

pub async fn handle_poison_command(args: &PoisonArgs) -> Result<()> {
    poison::execute(args).await
}

pub async fn handle_hop_by_hop_command(args: &HopByHopArgs) -> Result<()> {
    hopbyhop::execute(args).await
}

pub async fn handle_robots_command(args: &RobotsArgs) -> Result<()> {
    robots::execute(args).await
}

/// Same target rules as the cache-poisoning scan.
fn require_url(url: Option<&str>) -> ScanResult<String> {
    let config = ScanConfig::with_target(url.unwrap_or_default().trim());
    config.validate()?;
    Ok(config.target_url().to_string())
}

fn print_success(message: &str) {
    println!("{} {}", "[✓]".green().bold(), message);
}

fn print_failure(message: &str) {
    println!("{} {}", "[✗]".red().bold(), message);
}

fn print_warning(message: &str) {
    println!("{} {}", "[⚠]".yellow().bold(), message);
}

fn print_info(message: &str) {
    println!("{} {}", "[+]".green(), message);
}

fn status_color(code: u16, text: &str) -> ColoredString {
    match code {
        200..=299 => text.green(),
        300..=399 => text.yellow(),
        400..=499 => text.red(),
        500.. => text.magenta(),
        _ => text.normal(),
    }
}
