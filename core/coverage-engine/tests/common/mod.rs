//! FILENAME: core/coverage-engine/tests/common/mod.rs
//! Fixtures for the coverage integration tests.

#![allow(dead_code)]

use coverage_engine::{CoverageTree, TableDefinition, Taxonomy};
use facet_pivot::{parse_response, FacetRoles, PivotDecoder};

/// A trimmed CMIP6 Solr response: two tables, three variables.
///
/// - Amon/tas: historical has 5 institutions, piControl 1
/// - Amon/pr:  historical 2, amip 1 (pooled: 2)
/// - Omon/tos: historical 3
pub const CMIP6_RESPONSE: &str = r#"{
  "responseHeader": {"status": 0, "QTime": 12},
  "response": {"numFound": 1204, "start": 0, "docs": []},
  "facet_counts": {
    "facet_queries": {},
    "facet_fields": {},
    "facet_pivot": {
      "table_id,variable_id,experiment_id,institution_id": [
        {"field": "table_id", "value": "Amon", "count": 40, "pivot": [
          {"field": "variable_id", "value": "tas", "count": 25, "pivot": [
            {"field": "experiment_id", "value": "historical", "count": 20, "pivot": [
              {"field": "institution_id", "value": "NCAR", "count": 8},
              {"field": "institution_id", "value": "MOHC", "count": 5},
              {"field": "institution_id", "value": "IPSL", "count": 3},
              {"field": "institution_id", "value": "MPI-M", "count": 2},
              {"field": "institution_id", "value": "CCCma", "count": 2}
            ]},
            {"field": "experiment_id", "value": "piControl", "count": 5, "pivot": [
              {"field": "institution_id", "value": "NCAR", "count": 5}
            ]}
          ]},
          {"field": "variable_id", "value": "pr", "count": 15, "pivot": [
            {"field": "experiment_id", "value": "historical", "count": 10, "pivot": [
              {"field": "institution_id", "value": "NCAR", "count": 6},
              {"field": "institution_id", "value": "MOHC", "count": 4}
            ]},
            {"field": "experiment_id", "value": "amip", "count": 5, "pivot": [
              {"field": "institution_id", "value": "NCAR", "count": 5}
            ]}
          ]}
        ]},
        {"field": "table_id", "value": "Omon", "count": 9, "pivot": [
          {"field": "variable_id", "value": "tos", "count": 9, "pivot": [
            {"field": "experiment_id", "value": "historical", "count": 9, "pivot": [
              {"field": "institution_id", "value": "NCAR", "count": 3},
              {"field": "institution_id", "value": "IPSL", "count": 3},
              {"field": "institution_id", "value": "MIROC", "count": 3}
            ]}
          ]}
        ]}
      ]
    }
  }
}"#;

pub const AMON_TABLE: &str = r#"{
  "Header": {"table_id": "Table Amon", "mip_era": "CMIP6"},
  "variable_entry": {
    "tas": {"out_name": "tas", "standard_name": "air_temperature"},
    "pr": {"out_name": "pr", "standard_name": "precipitation_flux"},
    "ts": {"out_name": "ts", "standard_name": "surface_temperature"},
    "ta": {"out_name": "ta", "standard_name": "air_temperature"}
  }
}"#;

pub const DAY_TABLE: &str = r#"{
  "Header": {"table_id": "Table day"},
  "variable_entry": {
    "tasmax": {"out_name": "tasmax"},
    "tasmin": {"out_name": "tasmin"}
  }
}"#;

pub fn cmip6_tree() -> CoverageTree {
    let roles = FacetRoles::cmip6_institutions();
    let records = parse_response(CMIP6_RESPONSE, &roles).expect("fixture response parses");
    let node = PivotDecoder::counting(roles)
        .decode(&records)
        .expect("fixture pivot decodes");
    CoverageTree::from_node(&node).expect("fixture pivot has coverage shape")
}

pub fn cmip6_taxonomy() -> Taxonomy {
    let mut taxonomy = Taxonomy::new();
    for (table_id, json) in [("Amon", AMON_TABLE), ("day", DAY_TABLE)] {
        let definition = TableDefinition::from_json(json).expect("fixture table parses");
        taxonomy.insert_definition(table_id, &definition);
    }
    taxonomy
}
