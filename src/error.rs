//! Tooling faults
//!
//! These are distinct from findings: a fault means the gate could not do its
//! job, and the hook exits with code 1 instead of 2.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("malformed hook event: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    #[error("failed to read event from stdin: {0}")]
    ReadEvent(#[source] std::io::Error),

    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("rule registry error: {0}")]
    Registry(String),
}

impl GateError {
    pub fn read_file(path: &Path, source: std::io::Error) -> Self {
        GateError::ReadFile {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn config(path: &Path, message: impl std::fmt::Display) -> Self {
        GateError::Config {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

pub type GateResult<T> = Result<T, GateError>;
