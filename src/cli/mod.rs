//! Command-line interface for scorebook.
//!
//! Three commands:
//! - replay: rebuild a match from a delivery log file
//! - simulate: score a seeded synthetic match through the live pipeline
//! - feed: serve line-delimited JSON scoring commands over stdin

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{feed, replay, run, run_command, simulate};
pub use errors::{CliError, CliResult};
pub use io::{read_commands, write_error, write_response};
