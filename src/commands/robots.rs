// File: robots.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::Result;
use colored::*;
use std::time::Duration;

use super::{print_info, require_url, status_color};
use crate::cli::RobotsArgs;
use crate::robots::{robots_url, PathStatus, RobotsProbe};

pub async fn execute(args: &RobotsArgs) -> Result<()> {
    let url = require_url(args.url.as_deref())?;
    let probe = RobotsProbe::new(Duration::from_secs(args.timeout))?;

    print_info(&format!(
        "Fetching robots.txt from: {}",
        robots_url(&url).cyan()
    ));

    let reports = probe.run(&url).await?;
    if reports.is_empty() {
        print_info("No Allow/Disallow paths listed");
        return Ok(());
    }

    for report in &reports {
        let url = report.entry.url.blue();
        match &report.status {
            PathStatus::Skipped => {
                println!("{} [{} - contains pattern]", url, "SKIPPED".yellow())
            }
            PathStatus::Status { code, reason } => {
                let status = format!("{} {}", code, reason);
                println!("{} [{}]", url, status_color(*code, status.trim_end()));
            }
            PathStatus::Errored(e) => println!("{} [{}: {}]", url, "ERROR".red(), e),
        }
    }
    Ok(())
}
