use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Embedding request to model '{model}' failed: {reason}")]
    Embedding { model: String, reason: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector store operation failed: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit status for a run that terminated with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NotFound(_) => 0,
            Error::Io(_) => 1,
            Error::InvalidConfig(_) => 2,
            Error::Parse { .. } => 3,
            Error::Embedding { .. } => 4,
            Error::DimensionMismatch { .. } | Error::Store(_) => 5,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
