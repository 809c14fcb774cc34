//! FILENAME: core/coverage-engine/src/report.rs
//! Statistics Report - Runs every pass and assembles the labelled report.
//!
//! This is the report-assembly layer: it decides what happens when a
//! taxonomy-dependent statistic cannot be computed, and it is the only part
//! of the engine that logs.

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{CoverageError, Result};
use crate::stats::{
    contributors_per_experiment, contributors_per_variable, variables_below_threshold_contributors,
    variables_never_reported, variables_with_threshold_contributors, PerExperiment, PerTable,
    PerVariable, VariableScope,
};
use crate::taxonomy::Taxonomy;
use crate::tree::CoverageTree;

pub const DEFAULT_MIN_CONTRIBUTORS: usize = 5;
pub const DEFAULT_MAX_CONTRIBUTORS: usize = 3;

pub const NOT_REPORTED_LABEL: &str = "number of variables per table not reported";

// ============================================================================
// CONFIGURATION
// ============================================================================

/// What the innermost facet of the coverage tree counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContributorKind {
    #[default]
    Institution,
    Model,
}

impl ContributorKind {
    pub fn singular(&self) -> &'static str {
        match self {
            ContributorKind::Institution => "institution",
            ContributorKind::Model => "model",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            ContributorKind::Institution => "institutions",
            ContributorKind::Model => "models",
        }
    }
}

/// What to do when a gap statistic is requested without a taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingTaxonomyPolicy {
    /// Leave the statistic out of the report and log a warning.
    #[default]
    Omit,
    /// Fail the whole report.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Experiments need at least this many contributors to qualify a variable.
    pub min_contributors: usize,

    /// Variables with fewer pooled contributors than this are counted as
    /// under-supported.
    pub max_contributors: usize,

    pub contributor_kind: ContributorKind,

    /// Add the never-reported statistic (needs a taxonomy).
    pub count_missing_variables: bool,

    pub missing_taxonomy: MissingTaxonomyPolicy,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            min_contributors: DEFAULT_MIN_CONTRIBUTORS,
            max_contributors: DEFAULT_MAX_CONTRIBUTORS,
            contributor_kind: ContributorKind::Institution,
            count_missing_variables: false,
            missing_taxonomy: MissingTaxonomyPolicy::Omit,
        }
    }
}

impl ReportConfig {
    pub fn datasets_label(&self) -> String {
        format!(
            "number of datasets per table-variable-experiment-{}",
            self.contributor_kind.singular()
        )
    }

    pub fn per_experiment_label(&self) -> String {
        format!(
            "number of {} per table-variable-experiment",
            self.contributor_kind.plural()
        )
    }

    pub fn per_variable_label(&self) -> String {
        format!("number of {} per table-variable", self.contributor_kind.plural())
    }

    pub fn with_threshold_label(&self) -> String {
        format!(
            "number of variables per table with at least 1 experiment with =>{} {}",
            self.min_contributors,
            self.contributor_kind.plural()
        )
    }

    pub fn below_threshold_label(&self) -> String {
        format!(
            "number of variables per table with less than {} {}",
            self.max_contributors,
            self.contributor_kind.plural()
        )
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// One entry of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Statistic {
    Datasets(CoverageTree),
    PerExperiment(PerExperiment),
    PerVariable(PerVariable),
    PerTable(PerTable),
}

/// Ordered `label -> statistic` mapping, serialised as one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatisticsReport {
    entries: IndexMap<String, Statistic>,
}

impl StatisticsReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, statistic: Statistic) {
        self.entries.insert(label.into(), statistic);
    }

    pub fn get(&self, label: &str) -> Option<&Statistic> {
        self.entries.get(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Statistic)> {
        self.entries.iter()
    }

    /// Adds every entry of `other`, replacing entries with the same label.
    pub fn merge(&mut self, other: StatisticsReport) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Runs every pass over `tree` and assembles the labelled report.
///
/// The per-variable statistic iterates the taxonomy when one is supplied and
/// the tree otherwise. The never-reported statistic is only added when
/// `config.count_missing_variables` is set.
pub fn build_report(
    tree: &CoverageTree,
    taxonomy: Option<&Taxonomy>,
    config: &ReportConfig,
) -> Result<StatisticsReport> {
    let mut report = StatisticsReport::new();

    report.insert(config.datasets_label(), Statistic::Datasets(tree.clone()));

    let per_experiment = contributors_per_experiment(tree);
    debug!("contributors per experiment: {} tables", per_experiment.len());
    report.insert(config.per_experiment_label(), Statistic::PerExperiment(per_experiment));

    let scope = match taxonomy {
        Some(_) => VariableScope::Taxonomy,
        None => VariableScope::Observed,
    };
    let per_variable = contributors_per_variable(tree, taxonomy, scope)?;
    debug!("contributors per variable ({:?}): {} tables", scope, per_variable.len());
    report.insert(config.per_variable_label(), Statistic::PerVariable(per_variable));

    let with_threshold = variables_with_threshold_contributors(tree, config.min_contributors);
    debug!(
        "variables with >= {} contributors in one experiment: {} tables",
        config.min_contributors,
        with_threshold.len()
    );
    report.insert(config.with_threshold_label(), Statistic::PerTable(with_threshold));

    let below_threshold = variables_below_threshold_contributors(tree, config.max_contributors);
    debug!(
        "variables with < {} pooled contributors: {} tables",
        config.max_contributors,
        below_threshold.len()
    );
    report.insert(config.below_threshold_label(), Statistic::PerTable(below_threshold));

    if config.count_missing_variables {
        match variables_never_reported(tree, taxonomy) {
            Ok(not_reported) => {
                debug!("variables never reported: {} tables", not_reported.len());
                report.insert(NOT_REPORTED_LABEL, Statistic::PerTable(not_reported));
            }
            Err(err @ CoverageError::MissingTaxonomy { .. })
                if config.missing_taxonomy == MissingTaxonomyPolicy::Omit =>
            {
                warn!("omitting '{}': {}", NOT_REPORTED_LABEL, err);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(report)
}
