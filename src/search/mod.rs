//! Search-space expansion
//!
//! A tune config mirrors the base config's layout, but every leaf is a
//! declarative sampling spec. Resolving draws one value per leaf from an
//! injected [`Sampler`] and overlays the result on the base config.
//!
//! # Example
//!
//! ```
//! use afinar::config::HierarchicalConfig;
//! use afinar::search::{resolve, RandomSampler};
//!
//! let base = HierarchicalConfig::from_yaml_str("lr: 0.01\ngamma: 0.9\n")?;
//! let tune = HierarchicalConfig::from_yaml_str("lr: [float, [1.0e-4, 0.1, null, true]]\n")?;
//!
//! let mut sampler = RandomSampler::with_seed(0);
//! let trial = resolve(&base, &tune, &mut sampler)?;
//! assert!(trial.get("lr").and_then(|n| n.as_f64()).is_some());
//! assert_eq!(trial.get("gamma").and_then(|n| n.as_f64()), Some(0.9));
//! # Ok::<(), afinar::Error>(())
//! ```

mod expander;
mod sampler;
mod spec;


pub use expander::{resolve, SearchSpace, SearchSpaceExpander};
pub use sampler::{RandomSampler, ReplaySampler, Sampler, SamplerError};
pub use spec::{SamplingSpec, SpecKind};
