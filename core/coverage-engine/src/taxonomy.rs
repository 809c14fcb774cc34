//! FILENAME: core/coverage-engine/src/taxonomy.rs
//! Taxonomy - The expected variables of every table.
//!
//! A table definition document lists its variables under `variable_entry`;
//! the name a variable is published under is its `out_name`, which is what
//! the search index reports as `variable_id`. Coverage gaps are computed
//! against those names, not against the entry keys.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ============================================================================
// TABLE DEFINITION DOCUMENT
// ============================================================================

/// The part of a table definition document the taxonomy needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableDefinition {
    #[serde(default)]
    pub variable_entry: IndexMap<String, VariableEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariableEntry {
    pub out_name: String,
}

impl TableDefinition {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Distinct published variable names. Several entries may share one.
    pub fn out_names(&self) -> BTreeSet<String> {
        self.variable_entry
            .values()
            .map(|entry| entry.out_name.clone())
            .collect()
    }
}

// ============================================================================
// TAXONOMY
// ============================================================================

/// `table_id -> canonical variable names`, kept sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Taxonomy {
    tables: BTreeMap<String, BTreeSet<String>>,
}

impl Taxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or extends) a table's variable set.
    pub fn insert_table<I, S>(&mut self, table_id: impl Into<String>, variables: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .entry(table_id.into())
            .or_default()
            .extend(variables.into_iter().map(Into::into));
    }

    pub fn insert_definition(&mut self, table_id: impl Into<String>, definition: &TableDefinition) {
        self.insert_table(table_id, definition.out_names());
    }

    pub fn tables(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.tables.iter()
    }

    pub fn variables(&self, table_id: &str) -> Option<&BTreeSet<String>> {
        self.tables.get(table_id)
    }

    pub fn contains_table(&self, table_id: &str) -> bool {
        self.tables.contains_key(table_id)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Taxonomy
where
    K: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut taxonomy = Taxonomy::new();
        for (table_id, variables) in iter {
            taxonomy.insert_table(table_id, variables);
        }
        taxonomy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AMON_TABLE: &str = r#"{
        "Header": {"table_id": "Table Amon", "realm": "atmos"},
        "variable_entry": {
            "tas": {"out_name": "tas", "units": "K"},
            "pr": {"out_name": "pr", "units": "kg m-2 s-1"},
            "ta27": {"out_name": "ta", "units": "K"},
            "ta": {"out_name": "ta", "units": "K"}
        }
    }"#;

    #[test]
    fn test_out_names_deduplicate() {
        let definition = TableDefinition::from_json(AMON_TABLE).unwrap();
        let names: Vec<String> = definition.out_names().into_iter().collect();
        assert_eq!(names, vec!["pr", "ta", "tas"]);
    }

    #[test]
    fn test_definition_without_entries_is_empty() {
        let definition = TableDefinition::from_json(r#"{"Header": {}}"#).unwrap();
        assert!(definition.out_names().is_empty());
    }

    #[test]
    fn test_invalid_definition_is_json_error() {
        let err = TableDefinition::from_json(r#"{"variable_entry": {"tas": {}}}"#).unwrap_err();
        assert!(matches!(err, crate::CoverageError::Json(_)));
    }

    #[test]
    fn test_insert_definition_and_lookup() {
        let mut taxonomy = Taxonomy::new();
        taxonomy.insert_definition("Amon", &TableDefinition::from_json(AMON_TABLE).unwrap());
        taxonomy.insert_table("Omon", ["tos"]);

        assert_eq!(taxonomy.len(), 2);
        assert!(taxonomy.contains_table("Omon"));
        assert!(taxonomy.variables("Amon").unwrap().contains("ta"));
        assert!(taxonomy.variables("day").is_none());
    }

    #[test]
    fn test_collect_from_pairs() {
        let taxonomy: Taxonomy = vec![("Amon", vec!["tas", "pr"]), ("Amon", vec!["ua"])]
            .into_iter()
            .collect();
        assert_eq!(taxonomy.variables("Amon").map(BTreeSet::len), Some(3));
    }
}
