#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for geo gestión: corrects citizen-reported addresses
//! against a municipality's official street list and geocodes them.
//!
//! Without a subcommand an interactive menu is shown.
//!
//! Uses `indicatif-log-bridge` (via [`geo_gestion_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod commands;
mod context;
mod interactive;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::BulkOptions;
use crate::context::Settings;

#[derive(Parser)]
#[command(
    name = "geo_gestion",
    about = "Correct and geocode citizen-reported addresses"
)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Correct the street name of an address
    Correct {
        /// Free-text address (e.g., "Tres Ote. 5317")
        address: String,
    },
    /// Correct an address, then geocode it
    Resolve {
        /// Free-text address (e.g., "Tres Ote. 5317")
        address: String,
    },
    /// Show the official streets closest to an address
    Match {
        /// Free-text address
        address: String,
        /// Number of candidates to show
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// List the official street registry
    Streets,
    /// Correct and geocode every address of an incident dataset
    Bulk {
        /// Local CSV file (default: the profile's dataset URL)
        #[arg(long, conflicts_with = "url")]
        csv: Option<PathBuf>,
        /// CSV download URL (default: the profile's dataset URL)
        #[arg(long)]
        url: Option<String>,
        /// Header of the address column (default: the profile's column)
        #[arg(long)]
        column: Option<String>,
        /// Write all result rows to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Process only the first N rows (for testing)
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = geo_gestion_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&cli.settings, &multi).await;
    };

    let ctx = context::build(&cli.settings).await?;

    match command {
        Commands::Correct { address } => commands::correct(&ctx, &address),
        Commands::Resolve { address } => commands::resolve(&ctx, &address).await,
        Commands::Match { address, limit } => commands::show_matches(&ctx, &address, limit),
        Commands::Streets => commands::list_streets(&ctx),
        Commands::Bulk {
            csv,
            url,
            column,
            output,
            limit,
        } => {
            let opts = BulkOptions {
                csv,
                url,
                column,
                output,
                limit,
            };
            commands::bulk(&ctx, &multi, &opts).await?;
        }
    }

    Ok(())
}
