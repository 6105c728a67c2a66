// src/error.rs

//! Error types for component installation

use crate::source::LoadError;
use crate::store::StoreError;
use crate::validator::Rejection;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while installing components
#[derive(Error, Debug)]
pub enum Error {
    #[error("Knowledge store error: {0}")]
    Store(#[from] StoreError),

    #[error("Component \"{identifier}\" cannot be installed: {reason}")]
    Rejected {
        identifier: String,
        reason: Rejection,
    },

    #[error("Cyclic dependency: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("Failed to query dependencies of \"{identifier}\": {source}")]
    DependencyQuery {
        identifier: String,
        source: StoreError,
    },

    #[error("Dependency \"{dependency}\" is not installed: {source}")]
    DependencyFailed {
        dependency: String,
        source: Box<Error>,
    },

    #[error("Failed to fetch {address}: {reason}")]
    FetchFailed { address: String, reason: String },

    #[error("Failed to load {}: {source}", path.display())]
    LoadFailed { path: PathBuf, source: LoadError },

    #[error("Staging directory {} belongs to another component", path.display())]
    StagingConflict { path: PathBuf },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Installation cancelled")]
    Cancelled,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}

impl Error {
    /// Walk `DependencyFailed` wrappers down to the error that started the failure
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::DependencyFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for component manager operations
pub type Result<T> = std::result::Result<T, Error>;
