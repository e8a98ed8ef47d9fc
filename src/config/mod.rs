//! Hierarchical configuration model
//!
//! A config is an ordered tree of named fields. Leaves hold YAML values,
//! groups hold further fields, and preserve-verbatim fields hold a mapping
//! that is never interpreted as config structure.
//!
//! # Example
//!
//! ```
//! use afinar::config::HierarchicalConfig;
//!
//! let cfg = HierarchicalConfig::from_yaml_str("lr: 0.01\ndnd: {size: 2000}\n")?;
//! let flat = cfg.flatten();
//! assert_eq!(flat.keys().collect::<Vec<_>>(), vec!["lr", "dnd.size"]);
//!
//! let back = HierarchicalConfig::expand(&flat)?;
//! assert_eq!(back, cfg);
//! # Ok::<(), afinar::Error>(())
//! ```

mod flat;
mod key;
mod node;
mod yaml;

#[cfg(test)]
mod proptests;

pub use flat::{merge_into, merged, FlatMap};
pub use key::{split_path, FieldKey, Verbatim, PATH_SEPARATOR, VERBATIM_MARKER};
pub use node::{HierarchicalConfig, Node};
pub(crate) use node::display_value;
pub use yaml::sanitize;
