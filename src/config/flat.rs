//! Flat dot-path view and deep merging
//!
//! `{a: 1, b: {c: 2, d: 3}}` flattens to `{a: 1, b.c: 2, b.d: 3}`; expansion
//! is the inverse. Expansion rejects a key that is both a terminal value and
//! a prefix of another key (`a` and `a.b`), whatever order they arrive in.

use serde::{Serialize, Serializer};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::key::{join_path, split_path, Verbatim, PATH_SEPARATOR};
use super::node::{HierarchicalConfig, Node};
use crate::error::{Error, Result};

/// Ordered map from dot path to leaf value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatMap {
    entries: Mapping,
}

impl FlatMap {
    /// Create an empty flat map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a path. Overwrites keep the original position.
    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(Value::String(path.into()), value.into())
    }

    /// Get the value at a path
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.entries.get(path)
    }

    /// Check if a path is present
    pub fn contains_key(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(path, value)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().filter_map(|(k, v)| k.as_str().map(|k| (k, v)))
    }

    /// Paths in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }

    /// Right-biased merge: every path in `other` overwrites or extends `self`.
    pub fn merge(&mut self, other: FlatMap) {
        for (key, value) in other.entries {
            self.entries.insert(key, value);
        }
    }

    /// Borrow as a YAML mapping
    pub fn as_mapping(&self) -> &Mapping {
        &self.entries
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FlatMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut flat = Self::new();
        for (k, v) in iter {
            flat.insert(k, v);
        }
        flat
    }
}

impl Serialize for FlatMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// Recursively merge `src` over `dst`.
///
/// Nested mappings recurse, creating an empty destination mapping when the
/// key is absent or holds a scalar. Scalars overwrite unconditionally.
pub fn merge_into(dst: &mut Mapping, src: Mapping) {
    for (key, value) in src {
        match value {
            Value::Mapping(sub) => {
                if !dst.get(&key).is_some_and(Value::is_mapping) {
                    dst.insert(key.clone(), Value::Mapping(Mapping::new()));
                }
                if let Some(Value::Mapping(inner)) = dst.get_mut(&key) {
                    merge_into(inner, sub);
                }
            }
            scalar => {
                dst.insert(key, scalar);
            }
        }
    }
}

/// Owned variant of [`merge_into`].
pub fn merged(mut dst: Mapping, src: Mapping) -> Mapping {
    merge_into(&mut dst, src);
    dst
}

impl HierarchicalConfig {
    /// Flat dot-path view of every leaf.
    ///
    /// Paths use written names, so verbatim fields appear decorated
    /// (`optim.args_.lr`). Verbatim mappings are descended too. Empty groups
    /// and mappings are kept as a single empty-mapping leaf.
    pub fn flatten(&self) -> FlatMap {
        let mut flat = FlatMap::new();
        flatten_group(self, None, &mut flat);
        debug!(leaves = flat.len(), "flattened config");
        flat
    }

    /// Expand a flat map into a config.
    pub fn expand(flat: &FlatMap) -> Result<Self> {
        Self::expand_with(flat, &Verbatim::new())
    }

    /// Expand a flat map with an explicit verbatim annotation set.
    pub fn expand_with(flat: &FlatMap, verbatim: &Verbatim) -> Result<Self> {
        let mut nested = Mapping::new();
        for (path, value) in flat.iter() {
            let segments = split_path(path)?;
            check_prefix_conflict(&nested, &segments, value, path)?;
            merge_into(&mut nested, single_path(&segments, value.clone()));
        }
        debug!(leaves = flat.len(), fields = nested.len(), "expanded flat map");
        Self::from_mapping_with(&nested, verbatim)
    }

    /// Deep-merge `other` over this config (right-biased).
    ///
    /// Fields that are opaque in either config stay opaque in the result.
    pub fn merge(&mut self, other: &HierarchicalConfig) -> Result<()> {
        let verbatim: Verbatim = self
            .verbatim_names()
            .names()
            .chain(other.verbatim_names().names())
            .map(str::to_string)
            .collect();
        self.merge_with(other, &verbatim)
    }

    /// Deep-merge `other` over this config with an explicit verbatim set.
    pub fn merge_with(&mut self, other: &HierarchicalConfig, verbatim: &Verbatim) -> Result<()> {
        let map = merged(self.to_mapping(), other.to_mapping());
        *self = Self::from_mapping_with(&map, verbatim)?;
        Ok(())
    }
}

fn flatten_group(group: &HierarchicalConfig, prefix: Option<&str>, out: &mut FlatMap) {
    if group.is_empty() {
        if let Some(path) = prefix {
            out.insert(path, Mapping::new());
        }
        return;
    }
    for (key, node) in group.iter() {
        let path = join_path(prefix, key.written());
        match node {
            Node::Group(child) => flatten_group(child, Some(path.as_str()), out),
            Node::Opaque(map) => flatten_mapping(map, &path, out),
            Node::Leaf(value) => {
                out.insert(path, value.clone());
            }
        }
    }
}

/// Verbatim mappings are descended only while every key can be a path
/// segment. Otherwise the whole mapping is one leaf at `prefix`.
fn flatten_mapping(map: &Mapping, prefix: &str, out: &mut FlatMap) {
    if map.is_empty() || !map.keys().all(is_path_segment) {
        out.insert(prefix, map.clone());
        return;
    }
    for (key, value) in map.iter().filter_map(|(k, v)| k.as_str().map(|k| (k, v))) {
        let path = join_path(Some(prefix), key);
        match value {
            Value::Mapping(inner) => flatten_mapping(inner, &path, out),
            other => {
                out.insert(path, other.clone());
            }
        }
    }
}

fn is_path_segment(key: &Value) -> bool {
    key.as_str().is_some_and(|k| !k.is_empty() && !k.contains(PATH_SEPARATOR))
}

/// `[a, b, c]` with `v` becomes `{a: {b: {c: v}}}`.
fn single_path(segments: &[&str], value: Value) -> Mapping {
    let mut node = value;
    for segment in segments.iter().rev() {
        let mut map = Mapping::new();
        map.insert(Value::String((*segment).to_string()), node);
        node = Value::Mapping(map);
    }
    match node {
        Value::Mapping(map) => map,
        _ => Mapping::new(),
    }
}

fn check_prefix_conflict(
    nested: &Mapping,
    segments: &[&str],
    value: &Value,
    path: &str,
) -> Result<()> {
    let mut current = nested;
    for (depth, segment) in segments.iter().enumerate() {
        let is_last = depth + 1 == segments.len();
        match current.get(*segment) {
            None => return Ok(()),
            Some(Value::Mapping(inner)) => {
                if is_last {
                    if value.is_mapping() {
                        return Ok(());
                    }
                    return Err(Error::conflict(path, "is also a prefix of another key"));
                }
                current = inner;
            }
            Some(_) if is_last => return Ok(()),
            Some(_) => {
                let prefix = segments[..=depth].join(".");
                return Err(Error::conflict(
                    prefix,
                    format!("is a terminal value and also a prefix of '{path}'"),
                ));
            }
        }
    }
    Ok(())
}
