//! Trial preparation
//!
//! Thin glue between resolved configs and an external optimization loop:
//! naming a search, laying out one directory per trial, persisting each
//! trial's config, and the shape of the training-loop collaborator.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{HierarchicalConfig, Node};
use crate::error::{Error, Result};
use crate::search::{Sampler, SamplerError, SearchSpaceExpander};

/// Field holding the experiment name in base configs.
pub const EXPERIMENT_FIELD: &str = "experiment";

/// Field that receives each trial's output directory.
pub const OUT_DIR_FIELD: &str = "out_dir";

/// File name of the persisted trial config.
pub const CONFIG_FILE: &str = "cfg.yaml";

/// Metrics reported by a training loop, by name.
pub type Metrics = BTreeMap<String, f64>;

/// A user training loop driven by a resolved config.
///
/// `report` must be called with the step and the current metrics. It
/// returns an error when the optimization engine decides to stop the
/// trial; the loop should then return that error.
pub trait TrainingLoop {
    fn run(
        &mut self,
        config: &HierarchicalConfig,
        report: &mut dyn FnMut(usize, &Metrics) -> std::result::Result<(), SamplerError>,
    ) -> std::result::Result<(), SamplerError>;
}

/// Name a search, either fresh (`2024Aug24_cartpole`) or appended to an existing one.
///
/// An appended name must mention the experiment so unrelated searches are
/// not mixed.
pub fn search_name(experiment: &str, append: Option<&str>, today: NaiveDate) -> Result<String> {
    match append {
        Some(existing) if existing.contains(experiment) => Ok(existing.to_string()),
        Some(existing) => Err(Error::malformed(format!(
            "Trying to append `{experiment}` to `{existing}`"
        ))),
        None => Ok(format!("{}_{experiment}", today.format("%Y%b%d"))),
    }
}

/// Experiment name declared by a base config.
pub fn experiment_name(base: &HierarchicalConfig) -> Result<&str> {
    base.get(EXPERIMENT_FIELD).and_then(Node::as_str).ok_or_else(|| {
        Error::malformed(format!("base config needs a string `{EXPERIMENT_FIELD}` field"))
    })
}

/// A resolved trial written to disk
#[derive(Debug, Clone)]
pub struct PreparedTrial {
    /// Trial number within the search
    pub number: usize,
    /// Directory holding the trial's outputs
    pub dir: PathBuf,
    /// Resolved config, with `out_dir` pointing at `dir`
    pub config: HierarchicalConfig,
}

/// Directory layout for the trials of one search.
#[derive(Debug, Clone)]
pub struct TrialSetup {
    search_dir: PathBuf,
}

impl TrialSetup {
    /// Trials go under `<results_dir>/<search_name>`.
    pub fn new(results_dir: impl AsRef<Path>, search_name: &str) -> Self {
        Self { search_dir: results_dir.as_ref().join(search_name) }
    }

    /// Root directory of the search
    pub fn search_dir(&self) -> &Path {
        &self.search_dir
    }

    /// Directory of trial `number`
    pub fn trial_dir(&self, number: usize) -> PathBuf {
        self.search_dir.join(format!("trial_{number:04}"))
    }

    /// Number of the next trial: one past the highest `trial_NNNN` directory
    /// in the search directory, zero when there is none.
    pub fn next_trial_number(&self) -> Result<usize> {
        if !self.search_dir.is_dir() {
            return Ok(0);
        }
        let entries = fs::read_dir(&self.search_dir).map_err(|e| {
            Error::io(format!("Failed to read {}", self.search_dir.display()), e)
        })?;
        let mut next = 0;
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::io(format!("Failed to read {}", self.search_dir.display()), e)
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name();
            let number = name
                .to_string_lossy()
                .strip_prefix("trial_")
                .and_then(|n| n.parse::<usize>().ok());
            if let Some(number) = number {
                next = next.max(number + 1);
            }
        }
        Ok(next)
    }

    /// Resolve a config for trial `number` and point its `out_dir` at the
    /// trial directory. Nothing is written.
    pub fn resolve<S: Sampler + ?Sized>(
        &self,
        expander: &SearchSpaceExpander,
        sampler: &mut S,
        number: usize,
    ) -> Result<PreparedTrial> {
        let mut config = expander.resolve(sampler)?;
        let dir = self.trial_dir(number);
        config.set(OUT_DIR_FIELD, dir.display().to_string())?;
        Ok(PreparedTrial { number, dir, config })
    }

    /// Resolve trial `number` and write its config to `<trial_dir>/cfg.yaml`.
    pub fn prepare<S: Sampler + ?Sized>(
        &self,
        expander: &SearchSpaceExpander,
        sampler: &mut S,
        number: usize,
    ) -> Result<PreparedTrial> {
        let trial = self.resolve(expander, sampler, number)?;
        fs::create_dir_all(&trial.dir)
            .map_err(|e| Error::io(format!("Failed to create {}", trial.dir.display()), e))?;
        trial.config.to_yaml_file(trial.dir.join(CONFIG_FILE))?;
        info!(trial = number, dir = %trial.dir.display(), "prepared trial");
        Ok(trial)
    }
}

/// Run a training loop and track the last value of `metric`.
///
/// Every report is forwarded to `on_report` with the tracked value, which
/// is where an optimization engine records it and may raise a prune. A
/// report missing `metric` is rejected. Returns the last reported value.
pub fn run_trial<T, F>(
    training: &mut T,
    config: &HierarchicalConfig,
    metric: &str,
    mut on_report: F,
) -> Result<Option<f64>>
where
    T: TrainingLoop + ?Sized,
    F: FnMut(usize, f64) -> std::result::Result<(), SamplerError>,
{
    let mut last_score = None;
    let mut report = |step: usize, metrics: &Metrics| {
        let score = *metrics
            .get(metric)
            .ok_or_else(|| SamplerError::rejected(metric, "metric missing from report"))?;
        last_score = Some(score);
        on_report(step, score)
    };
    training.run(config, &mut report)?;
    Ok(last_score)
}
