// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — PDF image extraction with furniture detection.
//
// Entry point. Initialises logging, dispatches the subcommand, and turns a
// fatal error into a plain-language message and exit code 1.

mod cli;
mod extract_cmd;
mod inspect_cmd;

use bildwerk_core::human_errors::humanize_error;
use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.command.verbose() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Extract(args) => extract_cmd::run(args),
        Commands::Inspect(args) => inspect_cmd::run(args),
    };

    if let Err(err) = result {
        let human = humanize_error(&err);
        eprintln!("Error: {}", human.message);
        eprintln!("  {}", human.suggestion);
        tracing::debug!(%err, "Run aborted");
        std::process::exit(1);
    }
}
