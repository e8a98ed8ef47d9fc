//! Check command implementation

use crate::cli::logging::log;
use crate::cli::{CheckArgs, LogLevel};
use crate::config::HierarchicalConfig;
use crate::search::SearchSpace;

pub fn run_check(args: CheckArgs, level: LogLevel) -> Result<(), String> {
    let tune = HierarchicalConfig::from_yaml_file(&args.tune)
        .map_err(|e| format!("Config error: {e}"))?;
    let space = SearchSpace::from_config(&tune).map_err(|e| format!("[{}] {e}", e.code()))?;

    log(
        level,
        LogLevel::Normal,
        &format!("Search space has {} parameters", space.len()),
    );
    for (path, spec) in space.iter() {
        log(level, LogLevel::Normal, &format!("  {path}: {spec}"));
    }
    Ok(())
}
