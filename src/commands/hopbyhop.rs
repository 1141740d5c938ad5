// File: hopbyhop.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::Result;
use colored::*;
use std::time::Duration;

use super::{print_failure, print_info, print_success, print_warning, require_url, status_color};
use crate::cli::HopByHopArgs;
use crate::hopbyhop::{HopByHopProbe, HopOutcome, HopReport};
use crate::report;

pub async fn execute(args: &HopByHopArgs) -> Result<()> {
    let url = require_url(args.url.as_deref())?;
    let probe = HopByHopProbe::new(Duration::from_secs(args.timeout))?;

    report::print_banner("HTTP Header Tester");
    println!("{} {}\n", "Testing URL:".yellow(), url.blue());
    print_info("Making initial request...");

    let scan = probe.run(&url).await?;
    let baseline = &scan.baseline;

    println!("\n{}", "Baseline Information:".cyan().bold());
    println!("{} {}", "Protocol:".yellow(), baseline.version().green());
    println!(
        "{} {}",
        "Status Code:".yellow(),
        status_color(baseline.status(), &baseline.status_line())
    );
    println!(
        "{} {}",
        "Headers Count:".yellow(),
        baseline.headers().len().to_string().green()
    );

    println!("\n{}", "Starting Header Tests:".cyan().bold());
    for entry in &scan.reports {
        print_report(entry);
    }

    let changed = scan.reports.iter().filter(|r| r.changed()).count();
    println!(
        "\n{} {} of {} tested headers changed the response",
        "Summary:".yellow(),
        changed,
        scan.reports.len()
    );
    Ok(())
}

fn print_report(entry: &HopReport) {
    println!("\n{} Testing Header: {}", "[→]".magenta(), entry.header.cyan());

    match &entry.outcome {
        HopOutcome::Skipped => print_warning(&format!(
            "Skipping invalid Connection header for HTTP/2: {}",
            entry.header.cyan()
        )),
        HopOutcome::Errored(e) => println!("{} Error: {}", "[!]".red(), e.to_string().yellow()),
        HopOutcome::Compared {
            status_before,
            status_after,
            body_before,
            body_after,
            body_changed,
            headers,
        } => {
            if entry.status_changed() {
                print_failure(&format!(
                    "Status Code Changed! Original={} New={}",
                    status_before.yellow(),
                    status_after.red()
                ));
            } else {
                print_success(&format!("Status Code Unchanged: {}", status_after));
            }

            if *body_changed {
                print_failure(&format!(
                    "Body Changed! Original={} bytes New={} bytes",
                    body_before, body_after
                ));
            } else {
                print_success(&format!("Body Unchanged: {} bytes", body_after));
            }

            if headers.is_empty() {
                print_success("Headers Unchanged");
            } else {
                print_failure("Header Differences Found:");
                for diff in headers {
                    println!("  {}", format!("- {}", diff).red());
                }
            }

            if entry.changed() {
                print_warning("Changes detected (potential vulnerability)");
            } else {
                println!("{} No changes detected (secure)", "[✔]".green());
            }
        }
    }
}
