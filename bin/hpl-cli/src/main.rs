// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # hpl
//!
//! Command-line interface for huge-page pool layouts.
//!
//! ## Usage
//! ```bash
//! # Convert a pool layout to the legacy format read by the allocator
//! hpl convert -i layout.csv -o legacy_config.csv
//!
//! # Validate a layout of either schema
//! hpl check -i layout.csv
//!
//! # Print pools, ranges and page counts
//! hpl inspect -i layout.csv --json
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hpl",
    about = "Huge-page pool layout converter and checker",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (CLI arguments override it).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a layout and write it in the legacy format.
    Convert {
        /// Layout CSV file (pool or legacy schema).
        #[arg(short, long)]
        input: PathBuf,

        /// Legacy CSV file to write (default: from config, else "legacy_config.csv").
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report exact page counts instead of adding a spare page per size.
        #[arg(long)]
        no_padding: bool,
    },

    /// Validate a layout without writing anything.
    Check {
        /// Layout CSV file (pool or legacy schema).
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print a layout's pools, huge-page ranges and page counts.
    Inspect {
        /// Layout CSV file (pool or legacy schema).
        #[arg(short, long)]
        input: PathBuf,

        /// Print a JSON report instead of a table.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert {
            input,
            output,
            no_padding,
        } => commands::convert::execute(&config, input, output, no_padding),
        Commands::Check { input } => commands::check::execute(input),
        Commands::Inspect { input, json } => commands::inspect::execute(input, json),
    }
}
