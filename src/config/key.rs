//! Field names and the preserve-verbatim annotation

use std::collections::HashSet;

use crate::error::{Error, Result};

/// Separator between segments of a flat key.
pub const PATH_SEPARATOR: char = '.';

/// Trailing marker requesting preserve-verbatim semantics in config files.
pub const VERBATIM_MARKER: char = '_';

/// A validated field name.
///
/// `written` is the name as it appeared in the input (`message_`), `bare`
/// is the name with trailing markers stripped (`message`). Both resolve to
/// the same field on lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
    written: String,
    bare: String,
}

impl FieldKey {
    /// Parse and validate a field name.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::invalid_key(raw, "empty field name"));
        }
        if raw.contains(PATH_SEPARATOR) {
            return Err(Error::invalid_key(raw, "field name contains the path separator"));
        }
        let bare = raw.trim_end_matches(VERBATIM_MARKER);
        if bare.is_empty() {
            return Err(Error::invalid_key(raw, "field name is only verbatim markers"));
        }
        Ok(Self { written: raw.to_string(), bare: bare.to_string() })
    }

    /// Name as written, including any marker.
    pub fn written(&self) -> &str {
        &self.written
    }

    /// Name without markers.
    pub fn bare(&self) -> &str {
        &self.bare
    }

    /// Whether the written name carries the verbatim marker.
    pub fn is_marked(&self) -> bool {
        self.written.len() != self.bare.len()
    }

    /// Whether `name` refers to this field by either of its names.
    pub fn matches(&self, name: &str) -> bool {
        self.written == name || self.bare == name
    }
}

/// Explicit set of bare field names to keep verbatim.
///
/// Fields named here are treated as if they carried the trailing marker:
/// a mapping under them is stored opaque instead of becoming a group.
/// Names match at any depth.
#[derive(Debug, Clone, Default)]
pub struct Verbatim {
    names: HashSet<String>,
}

impl Verbatim {
    /// No annotations beyond markers in the input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bare field name to the set.
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Bare names in the set, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Whether the field should be kept verbatim.
    pub fn applies_to(&self, key: &FieldKey) -> bool {
        key.is_marked() || self.names.contains(key.bare())
    }
}

impl<S: Into<String>> FromIterator<S> for Verbatim {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { names: iter.into_iter().map(Into::into).collect() }
    }
}

/// Split a flat key into its segments, rejecting empty segments.
pub fn split_path(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() {
        return Err(Error::invalid_key(path, "empty flat key"));
    }
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(Error::invalid_key(path, "flat key has an empty path segment"));
    }
    Ok(segments)
}

/// Join a parent path and a child name.
pub fn join_path(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(p) => format!("{p}{PATH_SEPARATOR}{name}"),
        None => name.to_string(),
    }
}
