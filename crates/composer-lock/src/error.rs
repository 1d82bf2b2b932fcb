//! Error types for lockfile loading and package lookups.

use std::path::PathBuf;

use thiserror::Error;

use crate::decode::JsonError;
use crate::runtime::RuntimeError;

pub type Result<T> = std::result::Result<T, LockError>;

#[derive(Debug, Error)]
pub enum LockError {
    // Filesystem errors
    #[error("File {} not found or not readable.", .0.display())]
    FileNotReadable(PathBuf),

    #[error("File {} is {size} bytes, exceeding the {limit} byte limit", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    // Document decoding errors
    #[error("Json parser error: {0}")]
    Parse(#[from] JsonError),

    // Package entry errors
    #[error("malformed release time {value:?}: {reason}")]
    MalformedTimestamp { value: String, reason: String },

    #[error("invalid package entry: {0}")]
    InvalidPackage(String),

    #[error("invalid {key} field: {message}")]
    InvalidField { key: String, message: String },

    // Index lookups
    #[error("Package {0} not exists")]
    NotFound(String),

    #[error("invalid reader options: {0}")]
    InvalidConfig(String),
}
