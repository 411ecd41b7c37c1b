//! Error types for jobspec.

use crate::validation::Violations;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Specification errors
    #[error("Invalid job specification:\n{0}")]
    InvalidSpec(Violations),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid commit id: {0}")]
    InvalidCommitId(String),

    // Storage errors
    #[error("Blob reference error: {0}")]
    BlobReference(String),

    // Infrastructure errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<Violations> for Error {
    fn from(violations: Violations) -> Self {
        Error::InvalidSpec(violations)
    }
}
