use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the task repository and its store.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected before any state was touched.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("task not found: {0}")]
    NotFound(String),

    /// Reading or writing the data file failed.
    #[error("failed to access {path}: {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),

    /// An import payload was not a valid state document.
    #[error("import payload is not valid: {0}")]
    ImportFormat(#[source] serde_json::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        AppError::NotFound(id.into())
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, AppError::Persistence { .. } | AppError::Serialize(_))
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
