//! FILENAME: core/persistence/src/lib.rs
//! Coverage Persistence Module
//!
//! Reads the files the coverage report is built from and writes the report.
//!
//! Layers:
//! - taxonomy_reader: per-table variable definitions (`<project>_<table>.json`)
//! - response_reader: saved Solr facet responses
//! - report_writer: pretty-printed statistics reports

mod error;
mod report_writer;
mod response_reader;
mod taxonomy_reader;

pub use error::{PersistenceError, Result};
pub use report_writer::{report_file_name, save_report, REPORT_INDENT};
pub use response_reader::load_pivot_response;
pub use taxonomy_reader::{load_taxonomy, table_id_from_file_name, EXCLUDED_TABLES};

use std::path::Path;

/// Fails with `NotADirectory` unless `dir` exists and is a directory.
pub(crate) fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(PersistenceError::NotADirectory(dir.to_path_buf()))
    }
}
