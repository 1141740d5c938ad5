// File: main.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use clap::Parser;
use colored::*;
use log::debug;
use simple_logger::SimpleLogger;

use rpoison::cli::{parse_log_level, Cli, Commands};
use rpoison::commands;
use rpoison::error::ScanError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = SimpleLogger::new()
        .with_level(parse_log_level(&cli.log_level))
        .init()
    {
        eprintln!("Failed to initialize logger: {}", e);
    }
    debug!("{:?}", cli);

    let result = match &cli.command {
        Commands::Poison(args) => commands::handle_poison_command(args).await,
        Commands::HopByHop(args) => commands::handle_hop_by_hop_command(args).await,
        Commands::Robots(args) => commands::handle_robots_command(args).await,
    };

    if let Err(e) = result {
        eprintln!("{} Error: {}", "[!]".red(), e);
        if matches!(e.downcast_ref::<ScanError>(), Some(err) if err.is_fatal()) {
            eprintln!("Run with --help for usage.");
        }
        std::process::exit(1);
    }
}
