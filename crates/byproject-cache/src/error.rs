//! Error types for the cache layer.

/// Failure of a backend store operation.
///
/// Store errors never reach cache callers: reads degrade to misses and
/// writes are logged and absorbed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("{backend} unreachable: {reason}")]
    Unreachable {
        backend: &'static str,
        reason: String,
    },

    /// The backend rejected the command.
    #[error("{backend} rejected command: {reason}")]
    Rejected {
        backend: &'static str,
        reason: String,
    },

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The store is misconfigured.
    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// Creates a new unreachable error.
    pub fn unreachable(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::Unreachable {
            backend,
            reason: reason.into(),
        }
    }

    /// Creates a new rejected command error.
    pub fn rejected(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            backend,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Error returned to cache callers.
///
/// Only raised when the upstream fetch failed and the cache has no fallback
/// value to serve. Cloneable so every caller sharing one fetch gets the
/// same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// Nothing cached, upstream failed and no fallback is defined.
    #[error("no value available for '{key}': {reason}")]
    Unavailable { key: String, reason: String },
}

impl CacheError {
    /// Creates a new unavailable error.
    pub fn unavailable(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns the key the error relates to.
    pub fn key(&self) -> &str {
        match self {
            Self::Unavailable { key, .. } => key,
        }
    }

    /// Returns the upstream failure description.
    pub fn reason(&self) -> &str {
        match self {
            Self::Unavailable { reason, .. } => reason,
        }
    }
}
