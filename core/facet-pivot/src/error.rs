//! FILENAME: core/facet-pivot/src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecodeError>;

#[derive(Error, Debug)]
pub enum DecodeError {
    /// The records do not match the configured depth or leaf shape.
    /// `path` is the chain of facet values leading to the offending record.
    #[error("Malformed pivot at '{path}': {reason}")]
    MalformedPivot { path: String, reason: String },

    #[error("Facet pivot not found: {0}")]
    MissingFacetPivot(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    pub(crate) fn malformed(path: &[String], reason: impl Into<String>) -> Self {
        DecodeError::MalformedPivot {
            path: path.join("/"),
            reason: reason.into(),
        }
    }
}
