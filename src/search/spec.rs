//! Declarative sampling specs read from tune configs
//!
//! A tune leaf is written as `[kind, args]`:
//!
//! ```yaml
//! lr: [float, [1.0e-4, 0.1, null, true]]   # low, high, step, log
//! batch: [int, [16, 128, 16]]              # step and log may be omitted
//! optim: [categorical, [adam, sgd]]
//! ```

use serde_yaml::Value;
use std::fmt;

use crate::config::display_value;
use crate::error::{Error, Result};

/// Kind of a sampling spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecKind {
    Int,
    Float,
    Categorical,
}

impl SpecKind {
    /// Name as written in tune files
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecKind::Int => "int",
            SpecKind::Float => "float",
            SpecKind::Categorical => "categorical",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "int" => Some(SpecKind::Int),
            "float" => Some(SpecKind::Float),
            "categorical" => Some(SpecKind::Categorical),
            _ => None,
        }
    }
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed search-space leaf
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingSpec {
    /// Inclusive integer range, optionally stepped or log-scaled
    Int { low: i64, high: i64, step: Option<i64>, log: bool },
    /// Inclusive float range, optionally quantized or log-scaled
    Float { low: f64, high: f64, step: Option<f64>, log: bool },
    /// One of an ordered list of candidates
    Categorical { choices: Vec<Value> },
}

impl SamplingSpec {
    /// Parse the `[kind, args]` leaf found at `path`.
    pub fn parse(path: &str, value: &Value) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidSpec { path: path.into(), reason: reason.into() };

        let pair = match value.as_sequence() {
            Some(items) if items.len() == 2 => items,
            _ => return Err(invalid("expected a two-element [kind, args] sequence")),
        };

        let kind = match &pair[0] {
            Value::String(name) => SpecKind::parse(name).ok_or_else(|| {
                Error::UnsupportedSpecKind { path: path.into(), kind: name.clone() }
            })?,
            other => {
                return Err(Error::UnsupportedSpecKind {
                    path: path.into(),
                    kind: display_value(other),
                })
            }
        };

        let args = pair[1].as_sequence().ok_or_else(|| invalid("args must be a sequence"))?;

        match kind {
            SpecKind::Int => {
                let (low, high, step, log) = range_args(args, Value::as_i64, path)?;
                if low > high {
                    return Err(invalid("low must not exceed high"));
                }
                if step.is_some_and(|s| s <= 0) {
                    return Err(invalid("step must be positive"));
                }
                if log && low < 1 {
                    return Err(invalid("log scale needs low >= 1"));
                }
                if log && step.is_some_and(|s| s != 1) {
                    return Err(invalid("step cannot be combined with log scale"));
                }
                Ok(SamplingSpec::Int { low, high, step, log })
            }
            SpecKind::Float => {
                let (low, high, step, log) = range_args(args, Value::as_f64, path)?;
                if !(low.is_finite() && high.is_finite()) || low > high {
                    return Err(invalid("bounds must be finite with low <= high"));
                }
                if step.is_some_and(|s| s <= 0.0 || !s.is_finite()) {
                    return Err(invalid("step must be positive"));
                }
                if log && low <= 0.0 {
                    return Err(invalid("log scale needs low > 0"));
                }
                if log && step.is_some() {
                    return Err(invalid("step cannot be combined with log scale"));
                }
                Ok(SamplingSpec::Float { low, high, step, log })
            }
            SpecKind::Categorical => {
                if args.is_empty() {
                    return Err(invalid("categorical needs at least one choice"));
                }
                Ok(SamplingSpec::Categorical { choices: args.clone() })
            }
        }
    }

    /// Kind of this spec
    pub fn kind(&self) -> SpecKind {
        match self {
            SamplingSpec::Int { .. } => SpecKind::Int,
            SamplingSpec::Float { .. } => SpecKind::Float,
            SamplingSpec::Categorical { .. } => SpecKind::Categorical,
        }
    }

    /// Check if a concrete value lies inside this spec's domain
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            SamplingSpec::Int { low, high, step, .. } => value.as_i64().is_some_and(|v| {
                v >= *low
                    && v <= *high
                    && step.map_or(true, |s| {
                        (i128::from(v) - i128::from(*low)) % i128::from(s) == 0
                    })
            }),
            SamplingSpec::Float { low, high, .. } => {
                value.as_f64().is_some_and(|v| v >= *low && v <= *high)
            }
            SamplingSpec::Categorical { choices } => choices.contains(value),
        }
    }
}

impl fmt::Display for SamplingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingSpec::Int { low, high, step, log } => {
                write!(f, "int [{low}, {high}]")?;
                write_modifiers(f, step.map(|s| s.to_string()), *log)
            }
            SamplingSpec::Float { low, high, step, log } => {
                write!(f, "float [{low}, {high}]")?;
                write_modifiers(f, step.map(|s| s.to_string()), *log)
            }
            SamplingSpec::Categorical { choices } => {
                let choices: Vec<String> =
                    choices.iter().map(display_value).collect();
                write!(f, "categorical {{{}}}", choices.join(", "))
            }
        }
    }
}

fn write_modifiers(f: &mut fmt::Formatter<'_>, step: Option<String>, log: bool) -> fmt::Result {
    if let Some(step) = step {
        write!(f, " step={step}")?;
    }
    if log {
        write!(f, " log")?;
    }
    Ok(())
}

/// Read `[low, high, step?, log?]`.
fn range_args<T>(
    args: &[Value],
    number: fn(&Value) -> Option<T>,
    path: &str,
) -> Result<(T, T, Option<T>, bool)> {
    let invalid = |reason: String| Error::InvalidSpec { path: path.into(), reason };

    if !(2..=4).contains(&args.len()) {
        return Err(invalid(format!("expected [low, high, step, log], got {} args", args.len())));
    }
    let low = number(&args[0]).ok_or_else(|| invalid("low is not a number of the right kind".into()))?;
    let high =
        number(&args[1]).ok_or_else(|| invalid("high is not a number of the right kind".into()))?;
    let step = match args.get(2) {
        None | Some(Value::Null) => None,
        Some(v) => Some(number(v).ok_or_else(|| invalid("step must be a number or null".into()))?),
    };
    let log = match args.get(3) {
        None | Some(Value::Null) => false,
        Some(v) => v.as_bool().ok_or_else(|| invalid("log must be a boolean".into()))?,
    };
    Ok((low, high, step, log))
}
