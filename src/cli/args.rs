//! CLI argument types

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Afinar: hierarchical configs and hyperparameter search spaces
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "afinar")]
#[command(version)]
#[command(about = "Flatten, expand and sample hierarchical YAML experiment configs")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Pretty-print a configuration
    Show(ShowArgs),

    /// Print the flat `dotted.path: value` view of a configuration
    Flatten(FlattenArgs),

    /// Parse a tune file and list its search space
    Check(CheckArgs),

    /// Sample trial configs from base.yaml and tune.yaml
    Sample(SampleArgs),
}

/// Arguments for the show command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ShowArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// Arguments for the flatten command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct FlattenArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the check command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct CheckArgs {
    /// Path to the tune file
    #[arg(value_name = "TUNE")]
    pub tune: PathBuf,
}

/// Arguments for the sample command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct SampleArgs {
    /// Directory holding base.yaml and tune.yaml
    #[arg(value_name = "CONFIG_ROOT")]
    pub config_root: PathBuf,

    /// Number of trials to sample
    #[arg(short = 'n', long, default_value_t = 1)]
    pub trials: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Root directory for search results
    #[arg(short, long, default_value = "results")]
    pub results_dir: PathBuf,

    /// Append trials to an existing search instead of starting a new one
    #[arg(short, long)]
    pub append: Option<String>,

    /// Print sampled configs without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Output format for flatten command
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            _ => Err(format!(
                "Unknown output format: {s}. Valid formats: text, json, yaml"
            )),
        }
    }
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_show_command() {
        let cli = parse_args(["afinar", "show", "base.yaml"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Show(ShowArgs { config: PathBuf::from("base.yaml") })
        );
        assert!(!cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_parse_flatten_format() {
        let cli = parse_args(["afinar", "flatten", "base.yaml", "--format", "json"]).unwrap();
        match cli.command {
            Command::Flatten(args) => assert_eq!(args.format, OutputFormat::Json),
            _ => panic!("Expected Flatten command"),
        }

        let cli = parse_args(["afinar", "flatten", "base.yaml"]).unwrap();
        match cli.command {
            Command::Flatten(args) => assert_eq!(args.format, OutputFormat::Text),
            _ => panic!("Expected Flatten command"),
        }
    }

    #[test]
    fn test_parse_sample_defaults() {
        let cli = parse_args(["afinar", "sample", "configs/pong"]).unwrap();
        match cli.command {
            Command::Sample(args) => {
                assert_eq!(args.config_root, PathBuf::from("configs/pong"));
                assert_eq!(args.trials, 1);
                assert_eq!(args.seed, None);
                assert_eq!(args.results_dir, PathBuf::from("results"));
                assert!(args.append.is_none());
                assert!(!args.dry_run);
            }
            _ => panic!("Expected Sample command"),
        }
    }

    #[test]
    fn test_parse_sample_with_options() {
        let cli = parse_args([
            "afinar",
            "sample",
            "configs/pong",
            "-n",
            "8",
            "--seed",
            "42",
            "--results-dir",
            "/tmp/res",
            "--append",
            "2024Aug20_pong",
            "--dry-run",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Command::Sample(args) => {
                assert_eq!(args.trials, 8);
                assert_eq!(args.seed, Some(42));
                assert_eq!(args.results_dir, PathBuf::from("/tmp/res"));
                assert_eq!(args.append.as_deref(), Some("2024Aug20_pong"));
                assert!(args.dry_run);
            }
            _ => panic!("Expected Sample command"),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(["afinar"]).is_err());
        assert!(parse_args(["afinar", "show"]).is_err());
        assert!(parse_args(["afinar", "flatten", "a.yaml", "--format", "xml"]).is_err());
        assert!(parse_args(["afinar", "sample", "cfg", "--trials", "many"]).is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yaml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!("toml".parse::<OutputFormat>().is_err());
    }
}
