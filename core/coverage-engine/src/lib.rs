//! FILENAME: core/coverage-engine/src/lib.rs
//! Coverage statistics for decoded facet pivots.
//!
//! Consumes a `table -> variable -> experiment -> contributor` tree produced
//! by `facet-pivot` and, optionally, a taxonomy of the variables each table
//! is expected to carry. Produces the labelled statistics report written by
//! the coverage scripts.
//!
//! Layers:
//! - `tree`: Shape-validated coverage tree (WHAT the passes read)
//! - `taxonomy`: Expected variables per table
//! - `stats`: The aggregation passes (HOW we count)
//! - `report`: Report configuration and assembly (WHAT we emit)
//! - `catalog`: input4MIPs per-dataset records

pub mod tree;
pub mod taxonomy;
pub mod stats;
pub mod report;
pub mod catalog;
mod error;

pub use error::{CoverageError, Result};
pub use tree::{Contributors, CoverageTree, Experiments, Tables, Variables, COVERAGE_DEPTH, LEVEL_NAMES};
pub use taxonomy::{TableDefinition, Taxonomy, VariableEntry};
pub use stats::{
    contributors_per_experiment, contributors_per_variable, variables_below_threshold_contributors,
    variables_never_reported, variables_with_threshold_contributors, CoverageAggregator,
    PerExperiment, PerTable, PerVariable, VariableScope,
};
pub use report::{
    build_report, ContributorKind, MissingTaxonomyPolicy, ReportConfig, Statistic,
    StatisticsReport, DEFAULT_MAX_CONTRIBUTORS, DEFAULT_MIN_CONTRIBUTORS, NOT_REPORTED_LABEL,
};
pub use catalog::{build_catalog, Catalog, CatalogEntry};
