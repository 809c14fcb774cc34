//! FILENAME: core/persistence/src/error.rs

use std::path::PathBuf;

use coverage_engine::CoverageError;
use facet_pivot::DecodeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pivot decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Coverage error: {0}")]
    Coverage(#[from] CoverageError),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
