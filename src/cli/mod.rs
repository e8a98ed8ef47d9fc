//! CLI module for afinar
//!
//! # Usage
//!
//! ```bash
//! afinar show configs/pong/base.yaml
//! afinar flatten configs/pong/base.yaml --format json
//! afinar check configs/pong/tune.yaml
//! afinar sample configs/pong --trials 8 --seed 42
//! ```

mod args;
mod commands;
mod logging;

pub use args::{
    parse_args, CheckArgs, Cli, Command, FlattenArgs, OutputFormat, SampleArgs, ShowArgs,
};
pub use commands::run_command;
pub use logging::LogLevel;
