//! Search-space expansion: base config + tune config → concrete trial config

use tracing::debug;

use super::sampler::Sampler;
use super::spec::SamplingSpec;
use crate::config::{FlatMap, HierarchicalConfig, Verbatim};
use crate::error::Result;

/// Parsed search space, one spec per flattened tune leaf, in flat order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSpace {
    leaves: Vec<(String, SamplingSpec)>,
}

impl SearchSpace {
    /// Parse every leaf of a tune config.
    pub fn from_config(tune: &HierarchicalConfig) -> Result<Self> {
        Self::from_flat(&tune.flatten())
    }

    /// Parse every leaf of a flattened tune config.
    ///
    /// All leaves are parsed before anything is sampled, so a bad leaf is
    /// reported without any sampler call having happened.
    pub fn from_flat(flat: &FlatMap) -> Result<Self> {
        let leaves = flat
            .iter()
            .map(|(path, value)| Ok((path.to_string(), SamplingSpec::parse(path, value)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { leaves })
    }

    /// Number of leaves
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Check if there is nothing to sample
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Get the spec for a path
    pub fn get(&self, path: &str) -> Option<&SamplingSpec> {
        self.leaves.iter().find(|(p, _)| p == path).map(|(_, spec)| spec)
    }

    /// Iterate over `(path, spec)` in flat order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SamplingSpec)> {
        self.leaves.iter().map(|(p, spec)| (p.as_str(), spec))
    }

    /// Ask the sampler for each leaf exactly once, in order.
    ///
    /// The first sampler failure is returned as is and stops the walk.
    pub fn sample<S: Sampler + ?Sized>(&self, sampler: &mut S) -> Result<FlatMap> {
        let mut candidate = FlatMap::new();
        for (path, spec) in &self.leaves {
            debug!(path = %path, kind = %spec.kind(), "sampling");
            let value = sampler.sample(path, spec)?;
            candidate.insert(path.as_str(), value);
        }
        Ok(candidate)
    }
}

/// Overlays sampled values from a search space onto a base config.
#[derive(Debug, Clone)]
pub struct SearchSpaceExpander {
    base: FlatMap,
    space: SearchSpace,
    verbatim: Verbatim,
}

impl SearchSpaceExpander {
    /// Flatten the base and parse the tune config.
    pub fn new(base: &HierarchicalConfig, tune: &HierarchicalConfig) -> Result<Self> {
        Ok(Self {
            base: base.flatten(),
            space: SearchSpace::from_config(tune)?,
            verbatim: Verbatim::new(),
        })
    }

    /// Use an explicit verbatim annotation set when expanding results.
    pub fn with_verbatim(mut self, verbatim: Verbatim) -> Self {
        self.verbatim = verbatim;
        self
    }

    /// The parsed search space
    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    /// Produce one concrete config.
    ///
    /// Sampled values win over base values at the same path. A sampled path
    /// that collides with a base path prefix is a key conflict.
    pub fn resolve<S: Sampler + ?Sized>(&self, sampler: &mut S) -> Result<HierarchicalConfig> {
        let candidate = self.space.sample(sampler)?;
        debug!(sampled = candidate.len(), base = self.base.len(), "merging candidate");

        let mut flat = self.base.clone();
        flat.merge(candidate);
        HierarchicalConfig::expand_with(&flat, &self.verbatim)
    }
}

/// Resolve `tune` against `base` with `sampler` in one call.
pub fn resolve<S: Sampler + ?Sized>(
    base: &HierarchicalConfig,
    tune: &HierarchicalConfig,
    sampler: &mut S,
) -> Result<HierarchicalConfig> {
    SearchSpaceExpander::new(base, tune)?.resolve(sampler)
}
