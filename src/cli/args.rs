//! CLI argument definitions using clap
//!
//! Commands:
//! - scorebook replay <ledger.json> [--overs N] [--json]
//! - scorebook simulate [--overs N] [--seed N] [--data-dir <dir>] [--verbose]
//! - scorebook feed [--data-dir <dir>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// scorebook - live cricket scoring over an append-only delivery log
#[derive(Parser, Debug)]
#[command(name = "scorebook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rebuild a match from a delivery log file and print the scoreboard
    Replay {
        /// Path to a JSON array of delivery records (or a stored game file)
        ledger: PathBuf,

        /// Overs per innings the match was scheduled for (unlimited if omitted)
        #[arg(long)]
        overs: Option<u32>,

        /// Emit snapshot and rebuild counters as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Score a synthetic match through the full live pipeline
    Simulate {
        /// Overs per innings
        #[arg(long, default_value_t = 20)]
        overs: u32,

        /// Seed for the delivery generator; same seed, same match
        #[arg(long, default_value_t = 7)]
        seed: u64,

        /// Persist the game under this directory instead of in memory
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Print every broadcast payload as it is published
        #[arg(long)]
        verbose: bool,
    },

    /// Serve line-delimited JSON commands over stdin, one response per line
    Feed {
        /// Directory games are stored in
        #[arg(long, default_value = "./games")]
        data_dir: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
