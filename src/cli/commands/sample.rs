//! Sample command implementation

use chrono::Local;
use std::path::Path;

use crate::cli::logging::log;
use crate::cli::{LogLevel, SampleArgs};
use crate::config::{display_value, HierarchicalConfig};
use crate::search::{RandomSampler, SearchSpaceExpander};
use crate::trial::{experiment_name, search_name, TrialSetup};

/// File names looked up in the config root
pub const BASE_FILE: &str = "base.yaml";
pub const TUNE_FILE: &str = "tune.yaml";

fn load(root: &Path, name: &str) -> Result<HierarchicalConfig, String> {
    HierarchicalConfig::from_yaml_file(root.join(name)).map_err(|e| format!("Config error: {e}"))
}

pub fn run_sample(args: SampleArgs, level: LogLevel) -> Result<(), String> {
    let base = load(&args.config_root, BASE_FILE)?;
    let tune = load(&args.config_root, TUNE_FILE)?;

    let experiment = experiment_name(&base).map_err(|e| e.to_string())?;
    let search = search_name(experiment, args.append.as_deref(), Local::now().date_naive())
        .map_err(|e| e.to_string())?;
    let expander =
        SearchSpaceExpander::new(&base, &tune).map_err(|e| format!("[{}] {e}", e.code()))?;

    let mut sampler = match args.seed {
        Some(seed) => RandomSampler::with_seed(seed),
        None => RandomSampler::from_os_rng(),
    };
    let setup = TrialSetup::new(&args.results_dir, &search);
    let first = setup.next_trial_number().map_err(|e| e.to_string())?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Search {search}: {} parameters, trials {first}..{}",
            expander.space().len(),
            first + args.trials
        ),
    );

    for number in first..first + args.trials {
        sampler.clear();
        if args.dry_run {
            let trial = setup
                .resolve(&expander, &mut sampler, number)
                .map_err(|e| format!("[{}] {e}", e.code()))?;
            let yaml = trial.config.to_yaml_string().map_err(|e| e.to_string())?;
            println!("# {}\n{yaml}", trial.dir.display());
        } else {
            let trial = setup
                .prepare(&expander, &mut sampler, number)
                .map_err(|e| format!("[{}] {e}", e.code()))?;
            log(level, LogLevel::Normal, &format!("  {}", trial.dir.display()));
        }
        for (name, value) in sampler.params().iter() {
            log(
                level,
                LogLevel::Verbose,
                &format!("    {name} = {}", display_value(value)),
            );
        }
    }

    if args.dry_run {
        log(level, LogLevel::Normal, "Dry run, nothing written");
    }
    Ok(())
}
