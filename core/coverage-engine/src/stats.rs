//! FILENAME: core/coverage-engine/src/stats.rs
//! Coverage Statistics - The aggregation passes over a `CoverageTree`.
//!
//! Every pass borrows the tree, allocates its own output and has no
//! dependency on the others. Cardinality always means the number of distinct
//! contributor keys, never the sum of their dataset counts.
//!
//! Passes:
//! 1. `contributors_per_experiment`: contributors per (table, variable, experiment)
//! 2. `variables_with_threshold_contributors`: variables with one experiment at >= N
//! 3. `variables_below_threshold_contributors`: variables whose pooled contributors are < N
//! 4. `contributors_per_variable`: pooled contributors per (table, variable)
//! 5. `variables_never_reported`: taxonomy variables missing from the tree

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{CoverageError, Result};
use crate::taxonomy::Taxonomy;
use crate::tree::{CoverageTree, Experiments};

/// `table -> integer`; tables with nothing to report are omitted.
pub type PerTable = IndexMap<String, usize>;

/// `table -> variable -> integer`.
pub type PerVariable = IndexMap<String, IndexMap<String, usize>>;

/// `table -> variable -> experiment -> integer`.
pub type PerExperiment = IndexMap<String, IndexMap<String, IndexMap<String, usize>>>;

pub const CONTRIBUTORS_PER_VARIABLE: &str = "contributors_per_variable";
pub const VARIABLES_NEVER_REPORTED: &str = "variables_never_reported";

/// Which variables `contributors_per_variable` iterates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VariableScope {
    /// Only the variables present in the tree.
    #[default]
    Observed,
    /// Every canonical variable of every taxonomy table; absent ones are 0.
    Taxonomy,
}

// ============================================================================
// PASSES
// ============================================================================

/// Replaces each experiment's contributor mapping with its size.
pub fn contributors_per_experiment(tree: &CoverageTree) -> PerExperiment {
    tree.tables()
        .iter()
        .map(|(table_id, variables)| {
            let per_variable = variables
                .iter()
                .map(|(var_id, experiments)| {
                    let per_experiment = experiments
                        .iter()
                        .map(|(exp_id, contributors)| (exp_id.clone(), contributors.len()))
                        .collect();
                    (var_id.clone(), per_experiment)
                })
                .collect();
            (table_id.clone(), per_variable)
        })
        .collect()
}

/// Per table, the number of variables for which at least one experiment has
/// `min_contributors` or more contributors.
pub fn variables_with_threshold_contributors(tree: &CoverageTree, min_contributors: usize) -> PerTable {
    count_variables(tree, |experiments| {
        experiments
            .values()
            .any(|contributors| contributors.len() >= min_contributors)
    })
}

/// Per table, the number of variables whose contributors, pooled across all
/// experiments, number fewer than `max_contributors`.
pub fn variables_below_threshold_contributors(tree: &CoverageTree, max_contributors: usize) -> PerTable {
    count_variables(tree, |experiments| {
        contributor_union(experiments).len() < max_contributors
    })
}

/// Pooled contributor count per (table, variable), ignoring experiments.
///
/// With `VariableScope::Taxonomy` the taxonomy's tables and canonical
/// variables are iterated instead of the tree's, so a variable nobody
/// reported shows up as an explicit 0.
pub fn contributors_per_variable(
    tree: &CoverageTree,
    taxonomy: Option<&Taxonomy>,
    scope: VariableScope,
) -> Result<PerVariable> {
    match scope {
        VariableScope::Observed => Ok(tree
            .tables()
            .iter()
            .map(|(table_id, variables)| {
                let counts = variables
                    .iter()
                    .map(|(var_id, experiments)| (var_id.clone(), contributor_union(experiments).len()))
                    .collect();
                (table_id.clone(), counts)
            })
            .collect()),
        VariableScope::Taxonomy => {
            let taxonomy =
                taxonomy.ok_or_else(|| CoverageError::missing_taxonomy(CONTRIBUTORS_PER_VARIABLE))?;
            Ok(taxonomy
                .tables()
                .map(|(table_id, var_names)| {
                    let counts = var_names
                        .iter()
                        .map(|var_id| {
                            let count = tree
                                .experiments(table_id, var_id)
                                .map(|experiments| contributor_union(experiments).len())
                                .unwrap_or(0);
                            (var_id.clone(), count)
                        })
                        .collect();
                    (table_id.clone(), counts)
                })
                .collect())
        }
    }
}

/// Per taxonomy table, the number of canonical variables that never appear
/// under that table in the tree. A table missing from the tree counts all of
/// its variables.
pub fn variables_never_reported(tree: &CoverageTree, taxonomy: Option<&Taxonomy>) -> Result<PerTable> {
    let taxonomy = taxonomy.ok_or_else(|| CoverageError::missing_taxonomy(VARIABLES_NEVER_REPORTED))?;

    let mut counts = PerTable::new();
    for (table_id, var_names) in taxonomy.tables() {
        let missing = match tree.variables(table_id) {
            Some(reported) => var_names
                .iter()
                .filter(|var_id| !reported.contains_key(var_id.as_str()))
                .count(),
            None => var_names.len(),
        };
        if missing > 0 {
            counts.insert(table_id.clone(), missing);
        }
    }
    Ok(counts)
}

// ============================================================================
// HELPERS
// ============================================================================

/// Distinct contributor keys across every experiment of one variable.
fn contributor_union(experiments: &Experiments) -> FxHashSet<&str> {
    experiments
        .values()
        .flat_map(|contributors| contributors.keys().map(String::as_str))
        .collect()
}

/// Counts, per table, the variables whose experiments satisfy `qualifies`.
/// Tables with no qualifying variable are left out.
fn count_variables<F>(tree: &CoverageTree, qualifies: F) -> PerTable
where
    F: Fn(&Experiments) -> bool,
{
    let mut counts = PerTable::new();
    for (table_id, variables) in tree.tables() {
        let count = variables.values().filter(|experiments| qualifies(experiments)).count();
        if count > 0 {
            counts.insert(table_id.clone(), count);
        }
    }
    counts
}

// ============================================================================
// AGGREGATOR
// ============================================================================

/// A coverage tree paired with the optional taxonomy the gap passes need.
#[derive(Debug, Clone, Copy)]
pub struct CoverageAggregator<'a> {
    tree: &'a CoverageTree,
    taxonomy: Option<&'a Taxonomy>,
}

impl<'a> CoverageAggregator<'a> {
    pub fn new(tree: &'a CoverageTree) -> Self {
        CoverageAggregator { tree, taxonomy: None }
    }

    pub fn with_taxonomy(mut self, taxonomy: &'a Taxonomy) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    pub fn tree(&self) -> &'a CoverageTree {
        self.tree
    }

    pub fn taxonomy(&self) -> Option<&'a Taxonomy> {
        self.taxonomy
    }

    pub fn contributors_per_experiment(&self) -> PerExperiment {
        contributors_per_experiment(self.tree)
    }

    pub fn variables_with_threshold_contributors(&self, min_contributors: usize) -> PerTable {
        variables_with_threshold_contributors(self.tree, min_contributors)
    }

    pub fn variables_below_threshold_contributors(&self, max_contributors: usize) -> PerTable {
        variables_below_threshold_contributors(self.tree, max_contributors)
    }

    pub fn contributors_per_variable(&self, scope: VariableScope) -> Result<PerVariable> {
        contributors_per_variable(self.tree, self.taxonomy, scope)
    }

    pub fn variables_never_reported(&self) -> Result<PerTable> {
        variables_never_reported(self.tree, self.taxonomy)
    }
}
