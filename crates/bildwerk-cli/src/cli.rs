// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Extract meaningful images from PDF documents, dropping repeated
/// decoration.
#[derive(Debug, Parser)]
#[command(name = "bildwerk", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract images next to the PDF, then remove furniture
    Extract(ExtractArgs),

    /// List the XObjects of one page and whether each image decodes
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Path to the PDF file
    #[arg(value_name = "PDF")]
    pub file: PathBuf,

    /// Minimum width and height of an extracted image, in pixels
    #[arg(long, value_name = "N")]
    pub min_dimension: Option<u32>,

    /// Occurrences at which an image counts as furniture
    #[arg(long, value_name = "N")]
    pub furniture_threshold: Option<u32>,

    /// Render this 1-based page as a whole (repeatable)
    #[arg(long = "render-page", value_name = "N")]
    pub render_pages: Vec<u32>,

    /// Resolution of whole-page renders
    #[arg(long, value_name = "N")]
    pub dpi: Option<u32>,

    /// Do not render any page as a whole
    #[arg(long)]
    pub no_render: bool,

    /// JSON configuration file; flags override its values
    #[arg(long, value_name = "FILE.json")]
    pub config: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Log every gate decision
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Path to the PDF file
    #[arg(value_name = "PDF")]
    pub file: PathBuf,

    /// 1-based page number
    #[arg(long)]
    pub page: u32,

    /// Print the inspection as JSON
    #[arg(long)]
    pub json: bool,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Commands {
    pub fn verbose(&self) -> bool {
        match self {
            Commands::Extract(args) => args.verbose,
            Commands::Inspect(args) => args.verbose,
        }
    }
}
