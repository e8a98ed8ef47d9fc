//! Hierarchical config tree

use serde::{Serialize, Serializer};
use serde_yaml::{Mapping, Value};
use std::fmt;

use super::key::{split_path, FieldKey, Verbatim};
use crate::error::{Error, Result};

/// One node of the config tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Scalar, sequence, null or tagged value
    Leaf(Value),
    /// Mapping kept verbatim, never interpreted as config structure
    Opaque(Mapping),
    /// Nested group of fields
    Group(HierarchicalConfig),
}

impl Node {
    /// Build a node for `key`, deciding between group and opaque storage.
    fn build(key: &FieldKey, value: &Value, verbatim: &Verbatim) -> Result<Self> {
        match value {
            Value::Mapping(map) if verbatim.applies_to(key) => Ok(Node::Opaque(map.clone())),
            Value::Mapping(map) => {
                Ok(Node::Group(HierarchicalConfig::from_mapping_with(map, verbatim)?))
            }
            other => Ok(Node::Leaf(other.clone())),
        }
    }

    /// Convert back to a plain YAML value.
    pub fn to_value(&self) -> Value {
        match self {
            Node::Leaf(v) => v.clone(),
            Node::Opaque(map) => Value::Mapping(map.clone()),
            Node::Group(group) => Value::Mapping(group.to_mapping()),
        }
    }

    /// Leaf value, if this node is a leaf.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Node::Leaf(v) => Some(v),
            _ => None,
        }
    }

    /// Verbatim mapping, if this node is opaque.
    pub fn as_opaque(&self) -> Option<&Mapping> {
        match self {
            Node::Opaque(map) => Some(map),
            _ => None,
        }
    }

    /// Nested group, if this node is a group.
    pub fn as_group(&self) -> Option<&HierarchicalConfig> {
        match self {
            Node::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Leaf as f64 (ints convert).
    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    /// Leaf as i64.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    /// Leaf as string slice.
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Field {
    key: FieldKey,
    node: Node,
}

/// Ordered, nested key/value configuration.
///
/// Fields keep insertion order. A preserve-verbatim field (written with a
/// trailing `_`, or named in a [`Verbatim`] set) answers to both its
/// decorated and its bare name, but is stored and emitted once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HierarchicalConfig {
    fields: Vec<Field>,
}

impl HierarchicalConfig {
    /// Create an empty config
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a nested mapping, using only in-name markers for verbatim fields.
    pub fn from_mapping(map: &Mapping) -> Result<Self> {
        Self::from_mapping_with(map, &Verbatim::new())
    }

    /// Build from a nested mapping with an explicit verbatim annotation set.
    pub fn from_mapping_with(map: &Mapping, verbatim: &Verbatim) -> Result<Self> {
        let mut config = Self::new();
        for (raw_key, value) in map {
            let key = parse_key(raw_key)?;
            if let Some(existing) = config.position(key.bare()) {
                return Err(Error::conflict(
                    key.written(),
                    format!("duplicates field '{}'", config.fields[existing].key.written()),
                ));
            }
            let node = Node::build(&key, value, verbatim)?;
            config.fields.push(Field { key, node });
        }
        Ok(config)
    }

    /// Reduce to a nested mapping with one entry per field under its written name.
    pub fn to_mapping(&self) -> Mapping {
        self.fields
            .iter()
            .map(|f| (Value::String(f.key.written().to_string()), f.node.to_value()))
            .collect()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if config has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by decorated or bare name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.fields.iter().find(|f| f.key.matches(name)).map(|f| &f.node)
    }

    /// Look up a node by dot path through nested groups.
    pub fn get_path(&self, path: &str) -> Option<&Node> {
        let segments = split_path(path).ok()?;
        let (last, parents) = segments.split_last()?;
        let mut current = self;
        for segment in parents {
            current = current.get(segment)?.as_group()?;
        }
        current.get(last)
    }

    /// Check if a field exists under either name.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Assign a field.
    ///
    /// An existing field with the same bare name is replaced in place. Its
    /// written name is kept unless `name` itself carries the marker, and a
    /// verbatim field stays verbatim.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let mut key = FieldKey::parse(name)?;
        let mut verbatim = Verbatim::new();
        if let Some(existing) = self.position(key.bare()).map(|i| &self.fields[i]) {
            if matches!(existing.node, Node::Opaque(_)) {
                verbatim = verbatim.with(existing.key.bare());
            }
            if !key.is_marked() {
                key = existing.key.clone();
            }
        }
        let node = Node::build(&key, &value.into(), &verbatim)?;
        self.put(key, node);
        Ok(())
    }

    /// Assign a value by dot path, creating intermediate groups.
    pub fn set_path(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        let segments = split_path(path)?;
        let Some((last, parents)) = segments.split_last() else {
            return Err(Error::invalid_key(path, "empty flat key"));
        };
        let mut current = self;
        for segment in parents {
            current = current.group_mut(segment, path)?;
        }
        current.set(last, value)
    }

    /// All names a field answers to, aliases included.
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            names.push(field.key.bare());
            if field.key.is_marked() {
                names.push(field.key.written());
            }
        }
        names
    }

    /// Bare names of every opaque field, at any depth.
    pub fn verbatim_names(&self) -> Verbatim {
        let mut names = Vec::new();
        self.collect_opaque(&mut names);
        names.into_iter().collect()
    }

    fn collect_opaque<'a>(&'a self, names: &mut Vec<&'a str>) {
        for field in &self.fields {
            match &field.node {
                Node::Opaque(_) => names.push(field.key.bare()),
                Node::Group(group) => group.collect_opaque(names),
                Node::Leaf(_) => {}
            }
        }
    }

    /// Iterate over fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &Node)> {
        self.fields.iter().map(|f| (&f.key, &f.node))
    }

    fn position(&self, bare: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.key.bare() == bare)
    }

    fn put(&mut self, key: FieldKey, node: Node) {
        match self.position(key.bare()) {
            Some(i) => {
                let field = &mut self.fields[i];
                if key.is_marked() {
                    field.key = key;
                }
                field.node = node;
            }
            None => self.fields.push(Field { key, node }),
        }
    }

    fn group_mut(&mut self, name: &str, path: &str) -> Result<&mut HierarchicalConfig> {
        let key = FieldKey::parse(name)?;
        let index = match self.position(key.bare()) {
            Some(i) => i,
            None => {
                self.fields.push(Field { key, node: Node::Group(Self::new()) });
                self.fields.len() - 1
            }
        };
        match &mut self.fields[index].node {
            Node::Group(group) => Ok(group),
            _ => Err(Error::conflict(path, format!("'{name}' is not a group"))),
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        for field in &self.fields {
            write!(f, "{:indent$}{}: ", "", field.key.bare())?;
            match &field.node {
                Node::Group(group) => {
                    writeln!(f)?;
                    group.render(f, indent + 2)?;
                }
                Node::Leaf(value) => writeln!(f, "{}", display_value(value))?,
                Node::Opaque(map) => writeln!(f, "{}", display_mapping(map))?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for HierarchicalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}

impl Serialize for HierarchicalConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_mapping().serialize(serializer)
    }
}

impl TryFrom<Mapping> for HierarchicalConfig {
    type Error = Error;

    fn try_from(map: Mapping) -> Result<Self> {
        Self::from_mapping(&map)
    }
}

fn parse_key(raw: &Value) -> Result<FieldKey> {
    match raw {
        Value::String(name) => FieldKey::parse(name),
        other => Err(Error::malformed(format!(
            "field names must be strings, found `{}`",
            display_value(other)
        ))),
    }
}

/// Render a value on one line for pretty printing and sanitization.
///
/// A top-level string is shown as is. Strings nested in sequences or
/// mappings are quoted when they are empty or contain flow delimiters.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => display_nested(other),
    }
}

fn display_nested(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if needs_quotes(s) => format!("{s:?}"),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(display_nested).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(map) => display_mapping(map),
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, display_nested(&tagged.value)),
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty() || s.contains([',', ':', '{', '}', '[', ']', '"'])
}

fn display_mapping(map: &Mapping) -> String {
    let entries: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("{}: {}", display_nested(k), display_nested(v)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}
