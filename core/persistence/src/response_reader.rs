//! FILENAME: core/persistence/src/response_reader.rs

use std::fs;
use std::path::Path;

use facet_pivot::{parse_response, FacetRoles, PivotRecord};
use log::info;

use crate::{PersistenceError, Result};

/// Reads a saved Solr facet response and returns the pivot for `roles`.
pub fn load_pivot_response(path: &Path, roles: &FacetRoles) -> Result<Vec<PivotRecord>> {
    if !path.is_file() {
        return Err(PersistenceError::InvalidFormat(format!(
            "{} is not a response file",
            path.display()
        )));
    }

    let records = parse_response(&fs::read_to_string(path)?, roles)?;
    info!("read {} top-level pivot entries from {}", records.len(), path.display());
    Ok(records)
}
