//! Error types for keyed container access.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LookupError>;

/// Failure to resolve a key in a [`ValuesContainer`](crate::ValuesContainer).
///
/// Only strict containers, and direct dispatch on any container, produce
/// this error. It is surfaced to the caller as-is and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no value registered for key {key}")]
    MissingKey { key: String },
}

impl LookupError {
    /// Build a `MissingKey` error from any debuggable key.
    #[must_use]
    pub fn missing(key: &impl std::fmt::Debug) -> Self {
        Self::MissingKey {
            key: format!("{key:?}"),
        }
    }

    /// Debug rendering of the key that failed to resolve.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::MissingKey { key } => key,
        }
    }
}
