// File: poison.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::Result;
use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use std::fmt::Write;

use crate::cli::PoisonArgs;
use crate::report;
use crate::scanner::Scanner;

fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )?
        .with_key("eta", |state: &ProgressState, w: &mut dyn Write| {
            let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
        })
        .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    Ok(pb)
}

/// Per-check lines are printed unless the output is JSON; `--no-progress`
/// only hides the bar.
fn progress_for(args: &PoisonArgs) -> Result<Option<ProgressBar>> {
    if args.json {
        Ok(None)
    } else if args.no_progress {
        Ok(Some(ProgressBar::hidden()))
    } else {
        progress_bar().map(Some)
    }
}

pub async fn execute(args: &PoisonArgs) -> Result<()> {
    let config = args.to_config();
    // Validation happens here, before any request is sent.
    let mut scanner = Scanner::new(config)?;

    if !args.json {
        report::print_banner("HTTP Header Reflection Scanner");
        report::print_config(scanner.config());
    }

    if let Some(pb) = progress_for(args)? {
        scanner = scanner.with_progress(pb);
    }

    let result = scanner.run().await;

    if args.json {
        report::print_json(&result)?;
    } else {
        report::print_summary(&result);
    }

    Ok(())
}
