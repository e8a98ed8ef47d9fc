//! Afinar: hierarchical experiment configs and hyperparameter search spaces
//!
//! - [`config`]: ordered config trees loaded from YAML, flattened to
//!   `dotted.path → value` maps and expanded back, with preserve-verbatim
//!   fields whose contents are never treated as config structure.
//! - [`search`]: tune files whose leaves are sampling specs, resolved
//!   against a base config through an injected [`search::Sampler`].
//! - [`trial`]: search naming and per-trial output directories.
//! - [`cli`]: the `afinar` command line.

pub mod cli;
pub mod config;
pub mod error;
pub mod search;
pub mod trial;

pub use error::{Error, Result};
