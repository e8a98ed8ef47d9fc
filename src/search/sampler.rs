//! Sampling providers
//!
//! The expander never draws values itself. It asks an injected [`Sampler`]
//! once per search-space leaf. An optimization engine plugs in by
//! implementing the trait (or passing a closure); the crate ships a seeded
//! random sampler and a replay sampler for reproducing a recorded trial.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_yaml::Value;
use thiserror::Error;

use super::spec::SamplingSpec;
use crate::config::{FlatMap, HierarchicalConfig};

/// Failure signalled by a sampling provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerError {
    /// The optimization engine decided to stop this trial.
    #[error("Trial pruned while sampling '{name}'")]
    Pruned { name: String },

    /// The provider refused the request.
    #[error("Sampler rejected '{name}': {reason}")]
    Rejected { name: String, reason: String },
}

impl SamplerError {
    /// Create a rejection for `name`.
    pub fn rejected(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected { name: name.into(), reason: reason.into() }
    }
}

/// Resolves one declarative spec to a concrete value.
///
/// `name` is the dot path of the tune leaf and identifies the sampled
/// parameter to the provider.
pub trait Sampler {
    fn sample(&mut self, name: &str, spec: &SamplingSpec) -> Result<Value, SamplerError>;
}

impl<F> Sampler for F
where
    F: FnMut(&str, &SamplingSpec) -> Result<Value, SamplerError>,
{
    fn sample(&mut self, name: &str, spec: &SamplingSpec) -> Result<Value, SamplerError> {
        self(name, spec)
    }
}

/// Uniform random sampler with a seeded generator.
///
/// Every drawn value is recorded under its name, the way an optimization
/// trial keeps its suggested parameters.
#[derive(Debug)]
pub struct RandomSampler {
    rng: StdRng,
    params: FlatMap,
}

impl RandomSampler {
    /// Create a sampler with a fixed seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), params: FlatMap::new() }
    }

    /// Create a sampler seeded from the operating system
    pub fn from_os_rng() -> Self {
        Self { rng: StdRng::from_os_rng(), params: FlatMap::new() }
    }

    /// Values drawn so far, by name
    pub fn params(&self) -> &FlatMap {
        &self.params
    }

    /// Forget recorded values, keeping the generator state
    pub fn clear(&mut self) {
        self.params = FlatMap::new();
    }

    fn draw_int(&mut self, low: i64, high: i64, step: Option<i64>, log: bool) -> i64 {
        if log {
            let log_low = (low as f64).ln();
            let log_high = (high as f64 + 1.0).ln();
            let value = (log_low + self.rng.random::<f64>() * (log_high - log_low)).exp();
            return (value.floor() as i64).clamp(low, high);
        }
        // i128 so that any i64 range width fits
        let step = i128::from(step.unwrap_or(1));
        let n_steps = (i128::from(high) - i128::from(low)) / step;
        let value = i128::from(low) + self.rng.random_range(0..=n_steps) * step;
        i64::try_from(value).unwrap_or(high)
    }

    fn draw_float(&mut self, low: f64, high: f64, step: Option<f64>, log: bool) -> f64 {
        if log {
            let log_low = low.ln();
            let log_high = high.ln();
            let value = (log_low + self.rng.random::<f64>() * (log_high - log_low)).exp();
            return value.clamp(low, high);
        }
        if let Some(step) = step {
            let n_steps = (high / step - low / step).floor() as i64;
            let k = self.rng.random_range(0..=n_steps);
            return (low + k as f64 * step).clamp(low, high);
        }
        // interpolate without forming `high - low`, which overflows for wide bounds
        let r = self.rng.random::<f64>();
        (low * (1.0 - r) + high * r).clamp(low, high)
    }
}

impl Sampler for RandomSampler {
    fn sample(&mut self, name: &str, spec: &SamplingSpec) -> Result<Value, SamplerError> {
        let value = match spec {
            SamplingSpec::Int { low, high, step, log } => {
                Value::from(self.draw_int(*low, *high, *step, *log))
            }
            SamplingSpec::Float { low, high, step, log } => {
                Value::from(self.draw_float(*low, *high, *step, *log))
            }
            SamplingSpec::Categorical { choices } => {
                if choices.is_empty() {
                    return Err(SamplerError::rejected(name, "no choices"));
                }
                choices[self.rng.random_range(0..choices.len())].clone()
            }
        };
        self.params.insert(name, value.clone());
        Ok(value)
    }
}

/// Replays recorded values by name.
///
/// A name with no recorded value, or a value outside the spec's domain, is
/// rejected.
#[derive(Debug, Clone, Default)]
pub struct ReplaySampler {
    values: FlatMap,
}

impl ReplaySampler {
    /// Replay the given values
    pub fn new(values: FlatMap) -> Self {
        Self { values }
    }

    /// Replay the leaves of a previously resolved config.
    pub fn from_config(config: &HierarchicalConfig) -> Self {
        Self::new(config.flatten())
    }
}

impl Sampler for ReplaySampler {
    fn sample(&mut self, name: &str, spec: &SamplingSpec) -> Result<Value, SamplerError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| SamplerError::rejected(name, "no recorded value"))?;
        if !spec.contains(value) {
            return Err(SamplerError::rejected(name, format!("recorded value outside {spec}")));
        }
        Ok(value.clone())
    }
}
