//! Show command implementation

use crate::cli::logging::log;
use crate::cli::{LogLevel, ShowArgs};
use crate::config::HierarchicalConfig;

pub fn run_show(args: ShowArgs, level: LogLevel) -> Result<(), String> {
    let config = HierarchicalConfig::from_yaml_file(&args.config)
        .map_err(|e| format!("Config error: {e}"))?;

    log(
        level,
        LogLevel::Verbose,
        &format!("{} ({} top-level fields)", args.config.display(), config.len()),
    );
    print!("{config}");
    Ok(())
}
