//! Afinar CLI
//!
//! # Usage
//!
//! ```bash
//! # Pretty-print a config
//! afinar show configs/pong/base.yaml
//!
//! # Flat view as JSON
//! afinar flatten configs/pong/base.yaml --format json
//!
//! # List the search space of a tune file
//! afinar check configs/pong/tune.yaml
//!
//! # Sample 8 trial configs into results/<date>_<experiment>/trial_NNNN
//! afinar sample configs/pong --trials 8 --seed 42
//! ```

use afinar::cli::{run_command, Cli};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "afinar=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
