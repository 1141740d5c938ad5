// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::aggregator::{AggregateResult, Verdict};
use crate::config::ScanConfig;
use crate::probe::{ProbeOutcome, ProbeStatus};
use colored::*;

pub fn format_headers(headers: &[(String, String)]) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{}: {}", name.yellow(), value.blue()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One progress line per check, as printed during a scan.
pub fn format_outcome(outcome: &ProbeOutcome) -> String {
    let headers = format_headers(outcome.check().headers());
    match outcome.status() {
        ProbeStatus::Reflected(site) => {
            let mut line = format!(
                "{} {} for {} (in {})",
                "[✓]".green(),
                "Reflection found".green(),
                headers,
                site
            );
            if let Some(url) = outcome.requested_url() {
                line.push_str(&format!("\n  {}: {}", "URL".yellow(), url.blue()));
            }
            line
        }
        ProbeStatus::NotReflected => {
            format!("{} {} for {}", "[✗]".red(), "No reflection".dimmed(), headers)
        }
        ProbeStatus::Uncached => format!(
            "{} {} for {}",
            "[✗]".red(),
            "No cache signal".dimmed(),
            headers
        ),
        ProbeStatus::Errored(e) => {
            format!("{} {} → {}: {}", "[✗]".red(), headers, "Error".red(), e)
        }
    }
}

pub fn print_banner(title: &str) {
    println!("{}", title.cyan().bold());
    println!("{}", "─".repeat(60).dimmed());
}

pub fn print_config(config: &ScanConfig) {
    println!("{} Target URL: {}", "[+]".green(), config.target_url().blue());
    println!(
        "{} Threads: {}",
        "[+]".green(),
        config.workers().to_string().blue()
    );
    println!("{} User Agent: {}", "[+]".green(), config.user_agent().blue());
    if let Some(rate) = config.rate_limit() {
        println!("{} Rate limit: {}/s", "[+]".green(), rate.to_string().blue());
    }
    println!();
}

pub fn format_summary(result: &AggregateResult) -> String {
    let verdict = match result.verdict {
        Verdict::Vulnerable => result.verdict.to_string().red().bold(),
        Verdict::Secure => result.verdict.to_string().green().bold(),
    };
    let count = match result.verdict {
        Verdict::Vulnerable => result.reflections.to_string().red(),
        Verdict::Secure => result.reflections.to_string().green(),
    };

    let mut out = String::new();
    out.push_str(&format!("\n{}Scan Results\n", "─".repeat(20).bold()));
    out.push_str(&format!(
        "{}: {} of {} evaluated, {} without cache signal, {} errored ({} ms)\n",
        "Checks".yellow(),
        result.evaluated(),
        result.total_checks,
        result.uncached,
        result.errored,
        result.duration_ms()
    ));
    out.push_str(&format!("{}: {}\n", "Reflections Found".yellow(), count));
    out.push_str(&format!("{}: {}\n", "Final Status".yellow(), verdict));
    if result.all_errored() {
        out.push_str(&format!(
            "{} {}\n",
            "[!]".yellow(),
            "No check reached the target; the status above is untested".yellow()
        ));
    }
    out
}

pub fn print_summary(result: &AggregateResult) {
    println!("{}", format_summary(result));
}

pub fn print_json(result: &AggregateResult) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::ResultAggregator;
    use crate::checks::Check;
    use crate::error::ScanError;
    use crate::reflection::ReflectionSite;
    use std::sync::Arc;

    fn outcome(status: ProbeStatus) -> ProbeOutcome {
        let check = Arc::new(Check::new(
            "https://example.com",
            vec![("X-Forwarded-Host".to_string(), "terajari.me".to_string())],
            "terajari.me",
        ));
        ProbeOutcome::new(
            check,
            Some("https://example.com/?cachebuster=12".to_string()),
            status,
        )
    }

    #[test]
    fn test_format_outcome_lines() {
        colored::control::set_override(false);

        let line = format_outcome(&outcome(ProbeStatus::Reflected(ReflectionSite::Body)));
        assert!(line.starts_with("[✓] Reflection found for X-Forwarded-Host: terajari.me"));
        assert!(line.contains("URL: https://example.com/?cachebuster=12"));

        let line = format_outcome(&outcome(ProbeStatus::NotReflected));
        assert_eq!(line, "[✗] No reflection for X-Forwarded-Host: terajari.me");

        let line = format_outcome(&outcome(ProbeStatus::Uncached));
        assert_eq!(line, "[✗] No cache signal for X-Forwarded-Host: terajari.me");

        let line = format_outcome(&outcome(ProbeStatus::Errored(ScanError::Configuration(
            "boom".to_string(),
        ))));
        assert!(line.contains("Error: Configuration error: boom"));
    }

    #[test]
    fn test_format_headers_keeps_values_with_separators() {
        colored::control::set_override(false);

        let headers = vec![
            ("Accept-Version".to_string(), "a, b: c".to_string()),
            ("X-Forwarded-Scheme".to_string(), "http".to_string()),
        ];
        assert_eq!(
            format_headers(&headers),
            "Accept-Version: a, b: c, X-Forwarded-Scheme: http"
        );
    }

    #[tokio::test]
    async fn test_summary_reports_verdict() {
        colored::control::set_override(false);

        let aggregator = Arc::new(ResultAggregator::new("https://example.com"));
        aggregator
            .record(&outcome(ProbeStatus::Reflected(ReflectionSite::Body)))
            .await;
        let summary = format_summary(&aggregator.finalize().await);

        assert!(summary.contains("Reflections Found: 1"));
        assert!(summary.contains("Final Status: VULNERABLE"));
        assert!(!summary.contains("untested"));
    }

    #[tokio::test]
    async fn test_summary_flags_untested_target() {
        colored::control::set_override(false);

        let aggregator = Arc::new(ResultAggregator::new("http://127.0.0.1:1"));
        aggregator
            .record(&outcome(ProbeStatus::Errored(ScanError::Configuration(
                "down".to_string(),
            ))))
            .await;
        let summary = format_summary(&aggregator.finalize().await);

        assert!(summary.contains("Final Status: SECURE"));
        assert!(summary.contains("untested"));
    }
}
