// File: src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    /// The store could not be read, parsed, or is missing required structure.
    #[error("malformed store '{}': {reason}", .path.display())]
    MalformedStore { path: PathBuf, reason: String },

    #[error("medicine '{0}' not found in database")]
    NotFound(String),

    #[error("invalid recommendation count '{0}'")]
    InvalidCount(String),

    #[error("engine not initialized; load a database first")]
    NotInitialized,

    #[error("engine already loaded")]
    AlreadyLoaded,

    #[error("failed to read config file: {0}")]
    ConfigRead(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RecommendError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedStore {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecommendError>;
