//! FILENAME: core/coverage-engine/src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoverageError>;

#[derive(Error, Debug)]
pub enum CoverageError {
    /// The tree handed to the aggregator is not `table -> variable ->
    /// experiment -> contributor -> leaf`.
    #[error("Shape mismatch at '{path}': expected {expected}, found {found}")]
    ShapeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Statistic '{statistic}' requires a taxonomy")]
    MissingTaxonomy { statistic: String },

    #[error("Dataset '{dataset}' has no '{field}' value")]
    MissingAttribute { dataset: String, field: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoverageError {
    pub(crate) fn shape(path: &[&str], expected: impl Into<String>, found: impl Into<String>) -> Self {
        CoverageError::ShapeMismatch {
            path: path.join("/"),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn missing_taxonomy(statistic: impl Into<String>) -> Self {
        CoverageError::MissingTaxonomy {
            statistic: statistic.into(),
        }
    }
}
