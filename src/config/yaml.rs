//! YAML persistence for hierarchical configs

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::key::Verbatim;
use super::node::{display_value, HierarchicalConfig};
use crate::error::{Error, Result};

impl HierarchicalConfig {
    /// Parse a YAML document. An empty document yields an empty config.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Self::from_yaml_str_with(text, &Verbatim::new())
    }

    /// Parse a YAML document with an explicit verbatim annotation set.
    pub fn from_yaml_str_with(text: &str, verbatim: &Verbatim) -> Result<Self> {
        let doc: Value = serde_yaml::from_str(text)
            .map_err(|e| Error::malformed(format!("Failed to parse YAML config: {e}")))?;

        match doc {
            Value::Null => Ok(Self::new()),
            Value::Mapping(map) => Self::from_mapping_with(&map, verbatim),
            other => Err(Error::malformed(format!(
                "config root must be a mapping, found `{}`",
                display_value(&other)
            ))),
        }
    }

    /// Load a config from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file {}", path.display()), e)
        })?;
        Self::from_yaml_str(&text).map_err(|e| match e {
            Error::MalformedInput { message } => {
                Error::malformed(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    /// Render the sanitized config as YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        let doc = Value::Mapping(sanitize(&self.to_mapping()));
        serde_yaml::to_string(&doc)
            .map_err(|e| Error::malformed(format!("Failed to serialize config: {e}")))
    }

    /// Write the sanitized config to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_yaml_string()?;
        fs::write(path, text)
            .map_err(|e| Error::io(format!("Failed to write config file {}", path.display()), e))?;
        info!(path = %path.display(), fields = self.len(), "wrote config");
        Ok(())
    }
}

/// Reduce every value to plain YAML data.
///
/// Mappings recurse. Null, booleans, numbers, strings and sequences pass
/// unchanged. Tagged values are replaced by their display string, so they
/// do not survive a save/load cycle.
pub fn sanitize(map: &Mapping) -> Mapping {
    map.iter().map(|(k, v)| (k.clone(), sanitize_value(k, v))).collect()
}

fn sanitize_value(key: &Value, value: &Value) -> Value {
    match value {
        Value::Mapping(inner) => Value::Mapping(sanitize(inner)),
        Value::Tagged(tagged) => {
            warn!(
                field = %display_value(key),
                tag = %tagged.tag,
                "tagged value written as plain string"
            );
            Value::String(display_value(value))
        }
        other => other.clone(),
    }
}
