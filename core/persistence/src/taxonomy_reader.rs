//! FILENAME: core/persistence/src/taxonomy_reader.rs

use std::fs;
use std::path::Path;

use coverage_engine::{TableDefinition, Taxonomy};
use log::{debug, info};

use crate::{ensure_directory, Result};

/// Tables shipped alongside the variable tables that define no variables.
pub const EXCLUDED_TABLES: [&str; 5] = ["CV", "grids", "formula_terms", "coordinate", "input_example"];

/// The table id encoded in `<project>_<table>.json`, if `file_name` has that form.
pub fn table_id_from_file_name<'a>(file_name: &'a str, project: &str) -> Option<&'a str> {
    let table_id = file_name
        .strip_prefix(project)?
        .strip_prefix('_')?
        .strip_suffix(".json")?;
    if table_id.is_empty() {
        None
    } else {
        Some(table_id)
    }
}

/// Builds the taxonomy from every `<project>_<table>.json` file in `dir`.
///
/// Files belonging to other projects and the tables in `EXCLUDED_TABLES`
/// are ignored.
pub fn load_taxonomy(dir: &Path, project: &str) -> Result<Taxonomy> {
    ensure_directory(dir)?;

    let mut taxonomy = Taxonomy::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some(table_id) = table_id_from_file_name(file_name, project) else {
            continue;
        };
        if EXCLUDED_TABLES.contains(&table_id) {
            debug!("skipping non-variable table {}", file_name);
            continue;
        }

        let definition = TableDefinition::from_json(&fs::read_to_string(&path)?)?;
        taxonomy.insert_definition(table_id, &definition);
    }

    info!("loaded {} {} tables from {}", taxonomy.len(), project, dir.display());
    Ok(taxonomy)
}
