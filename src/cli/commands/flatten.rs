//! Flatten command implementation

use crate::cli::logging::log;
use crate::cli::{FlattenArgs, LogLevel, OutputFormat};
use crate::config::{display_value, FlatMap, HierarchicalConfig};

pub fn run_flatten(args: FlattenArgs, level: LogLevel) -> Result<(), String> {
    let config = HierarchicalConfig::from_yaml_file(&args.config)
        .map_err(|e| format!("Config error: {e}"))?;
    let flat = config.flatten();
    log(level, LogLevel::Verbose, &format!("{} leaves", flat.len()));
    println!("{}", render(&flat, args.format)?);
    Ok(())
}

pub(crate) fn render(flat: &FlatMap, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Text => Ok(flat
            .iter()
            .map(|(path, value)| format!("{path}: {}", display_value(value)))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => serde_json::to_string_pretty(flat)
            .map_err(|e| format!("JSON serialization error: {e}")),
        OutputFormat::Yaml => serde_yaml::to_string(flat)
            .map(|yaml| yaml.trim_end().to_string())
            .map_err(|e| format!("YAML serialization error: {e}")),
    }
}
