//! Error types shared by the configuration and localization stores.
//!
//! Load errors are reported once and then kept on the store that failed;
//! lookups never return them. Binaries wrap these in `anyhow`.

use std::io;
use thiserror::Error;

/// Failure to load one of the bundled source documents.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The logical path does not exist in the resource bundle.
    #[error("resource not found: {path}")]
    SourceMissing { path: String },

    /// The resource exists but could not be read.
    #[error("failed to read resource {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The resource was read but its content is malformed.
    #[error("failed to parse resource {path}: {reason}")]
    ParseFailure { path: String, reason: String },
}

impl LoadError {
    /// Logical path of the resource that failed to load.
    pub fn path(&self) -> &str {
        match self {
            LoadError::SourceMissing { path }
            | LoadError::Unreadable { path, .. }
            | LoadError::ParseFailure { path, .. } => path,
        }
    }
}

/// Failure to persist a preference value.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preference store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A string that is not a usable locale identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("locale identifier is empty")]
    Empty,

    #[error("invalid locale identifier: '{0}'")]
    Invalid(String),
}
