// File: cli.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use std::num::NonZeroU32;

use crate::config::{default_workers, ScanConfig, DEFAULT_USER_AGENT};

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long = "log-level", default_value = "warn", global = true)]
    pub log_level: String,

    #[arg(long = "no-color", help = "Disable colored output", global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inject unkeyed headers and look for cached reflections
    Poison(PoisonArgs),
    /// Diff responses when baseline headers are named in `Connection`
    HopByHop(HopByHopArgs),
    /// Check the paths listed in robots.txt
    Robots(RobotsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PoisonArgs {
    #[arg(short = 'u', long = "url", help = "Target URL to test")]
    pub url: Option<String>,

    #[arg(
        long = "user-agent",
        visible_alias = "ua",
        default_value = DEFAULT_USER_AGENT,
        help = "Custom User-Agent header"
    )]
    pub user_agent: String,

    #[arg(
        short = 't',
        long = "threads",
        help = "Number of concurrent workers (default: CPU cores × 5)"
    )]
    pub threads: Option<usize>,

    #[arg(
        long = "connect-timeout",
        default_value_t = 10,
        help = "Connect timeout in seconds"
    )]
    pub connect_timeout: u64,

    #[arg(
        long = "timeout",
        default_value_t = 15,
        help = "Request timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(long = "rate-limit", help = "Maximum requests per second")]
    pub rate_limit: Option<u32>,

    #[arg(long = "json", help = "Print the result as JSON")]
    pub json: bool,

    #[arg(long = "no-progress", help = "Hide the progress bar; per-check lines are still printed")]
    pub no_progress: bool,
}

impl PoisonArgs {
    pub fn to_config(&self) -> ScanConfig {
        let mut config = ScanConfig::new();
        config.set_target_url(self.url.clone().unwrap_or_default());
        config.set_user_agent(self.user_agent.clone());
        config.set_workers(self.threads.unwrap_or_else(default_workers));
        config.set_connect_timeout(self.connect_timeout);
        config.set_timeout(self.timeout);
        config.set_rate_limit(self.rate_limit.and_then(NonZeroU32::new));
        config
    }
}

#[derive(Args, Debug, Clone)]
pub struct HopByHopArgs {
    #[arg(short = 'u', long = "url", help = "Target URL to test")]
    pub url: Option<String>,

    #[arg(
        long = "timeout",
        default_value_t = 30,
        help = "Request timeout in seconds"
    )]
    pub timeout: u64,
}

#[derive(Args, Debug, Clone)]
pub struct RobotsArgs {
    #[arg(short = 'u', long = "url", help = "Base URL whose robots.txt is read")]
    pub url: Option<String>,

    #[arg(
        long = "timeout",
        default_value_t = 10,
        help = "Request timeout in seconds"
    )]
    pub timeout: u64,
}

pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Warn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_poison_defaults() {
        let cli = Cli::try_parse_from(["rpoison", "poison", "--url", "https://example.com"])
            .unwrap();
        assert_eq!(cli.log_level, "warn");
        assert!(!cli.no_color);

        let Commands::Poison(args) = cli.command else {
            panic!("expected poison subcommand");
        };
        let config = args.to_config();
        assert_eq!(config.target_url(), "https://example.com");
        assert_eq!(config.user_agent(), DEFAULT_USER_AGENT);
        assert_eq!(config.workers(), default_workers());
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert!(config.rate_limit().is_none());
        assert!(!args.json);
    }

    #[test]
    fn test_parse_poison_overrides() {
        let cli = Cli::try_parse_from([
            "rpoison",
            "--no-color",
            "poison",
            "-u",
            "https://example.com",
            "--ua",
            "agent/1",
            "-t",
            "3",
            "--rate-limit",
            "0",
            "--json",
        ])
        .unwrap();
        assert!(cli.no_color);

        let Commands::Poison(args) = cli.command else {
            panic!("expected poison subcommand");
        };
        let config = args.to_config();
        assert_eq!(config.user_agent(), "agent/1");
        assert_eq!(config.workers(), 3);
        assert!(config.rate_limit().is_none());
        assert!(args.json);
    }

    #[test]
    fn test_missing_url_parses_to_invalid_config() {
        let cli = Cli::try_parse_from(["rpoison", "poison"]).unwrap();
        let Commands::Poison(args) = cli.command else {
            panic!("expected poison subcommand");
        };
        assert!(args.to_config().validate().is_err());
    }

    #[test]
    fn test_parse_sibling_commands() {
        let cli = Cli::try_parse_from(["rpoison", "hop-by-hop", "--url", "https://example.com"])
            .unwrap();
        assert!(matches!(cli.command, Commands::HopByHop(ref a) if a.timeout == 30));

        let cli = Cli::try_parse_from(["rpoison", "robots", "-u", "https://example.com"]).unwrap();
        assert!(matches!(cli.command, Commands::Robots(ref a) if a.timeout == 10));
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_log_level("off"), LevelFilter::Off);
        assert_eq!(parse_log_level("bogus"), LevelFilter::Warn);
    }
}
