//! CLI command implementations

mod check;
mod flatten;
mod sample;
mod show;

#[cfg(test)]
mod tests;

use crate::cli::{Cli, Command, LogLevel};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);

    match cli.command {
        Command::Show(args) => show::run_show(args, log_level),
        Command::Flatten(args) => flatten::run_flatten(args, log_level),
        Command::Check(args) => check::run_check(args, log_level),
        Command::Sample(args) => sample::run_sample(args, log_level),
    }
}
