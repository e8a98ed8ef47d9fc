//! Error types with actionable diagnostics.
//!
//! Every failure surfaces to the immediate caller. Nothing in the crate
//! retries or recovers partially.

use thiserror::Error;

use crate::search::SamplerError;

/// Result type alias for afinar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by config construction, flattening, expansion and resolution.
#[derive(Error, Debug)]
pub enum Error {
    /// Input mapping or YAML document cannot be interpreted.
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    /// Field name or flat key violates the naming rules.
    #[error("Invalid key '{key}': {reason}\n  → Field names must be non-empty and must not contain '.'")]
    InvalidKey { key: String, reason: String },

    /// Search-space leaf declares a kind other than int, float or categorical.
    #[error("Unsupported sampling kind `{kind}` at '{path}'\n  → Supported kinds: int, float, categorical")]
    UnsupportedSpecKind { path: String, kind: String },

    /// Search-space leaf has a recognized kind but unusable arguments.
    #[error("Invalid sampling spec at '{path}': {reason}")]
    InvalidSpec { path: String, reason: String },

    /// A key is both a terminal value and a prefix of another key.
    #[error("Key conflict at '{key}': {reason}")]
    KeyConflict { key: String, reason: String },

    /// The sampling provider rejected a request. Carried unchanged.
    #[error(transparent)]
    Provider(#[from] SamplerError),

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a malformed-input error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput { message: message.into() }
    }

    /// Create an invalid-key error.
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into(), reason: reason.into() }
    }

    /// Create a key-conflict error.
    pub fn conflict(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::KeyConflict { key: key.into(), reason: reason.into() }
    }

    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Check if this error stems from caller input rather than the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput { .. }
                | Self::InvalidKey { .. }
                | Self::UnsupportedSpecKind { .. }
                | Self::InvalidSpec { .. }
                | Self::KeyConflict { .. }
        )
    }

    /// Get the error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput { .. } => "E001",
            Self::InvalidKey { .. } => "E002",
            Self::KeyConflict { .. } => "E003",
            Self::UnsupportedSpecKind { .. } => "E010",
            Self::InvalidSpec { .. } => "E011",
            Self::Provider(_) => "E020",
            Self::Io { .. } => "E050",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_error_codes_are_unique() {
        let errors = vec![
            Error::malformed(""),
            Error::invalid_key("", ""),
            Error::conflict("", ""),
            Error::UnsupportedSpecKind { path: "".into(), kind: "".into() },
            Error::InvalidSpec { path: "".into(), reason: "".into() },
            Error::Provider(SamplerError::Pruned { name: "lr".into() }),
            Error::io("", std::io::Error::other("x")),
        ];

        let codes: HashSet<_> = errors.iter().map(Error::code).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_unsupported_kind_is_actionable() {
        let err = Error::UnsupportedSpecKind { path: "optim.lr".into(), kind: "enum".into() };
        let msg = err.to_string();
        assert!(msg.contains("`enum`"));
        assert!(msg.contains("optim.lr"));
        assert!(msg.contains("categorical"));
    }

    #[test]
    fn test_provider_error_is_transparent() {
        let inner = SamplerError::Pruned { name: "lr".into() };
        let expected = inner.to_string();
        let err: Error = inner.into();
        assert_eq!(err.to_string(), expected);
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_user_error_classification() {
        assert!(Error::malformed("bad").is_user_error());
        assert!(Error::conflict("a", "prefix").is_user_error());
        assert!(!Error::io("read", std::io::Error::other("x")).is_user_error());
    }
}
