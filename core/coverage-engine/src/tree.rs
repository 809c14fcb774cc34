//! FILENAME: core/coverage-engine/src/tree.rs
//! Coverage Tree - Shape-validated view of a decoded coverage pivot.
//!
//! The aggregation passes only ever see `table -> variable -> experiment ->
//! contributor -> leaf`. Building a `CoverageTree` checks that shape once, so
//! a tree of the wrong depth fails here with the path where it went wrong
//! rather than somewhere inside a pass.
//!
//! Mappings that collided on one key during decoding are folded back into a
//! single mapping first: counts are distinct-key unions, so two `historical`
//! entries with contributors {A} and {B} are one experiment with {A, B}.

use facet_pivot::{Branch, Leaf, PivotNode};
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{CoverageError, Result};

/// Number of mapping levels in a coverage tree.
pub const COVERAGE_DEPTH: usize = 4;

/// Semantic name of each mapping level, outermost first.
pub const LEVEL_NAMES: [&str; COVERAGE_DEPTH] = ["table", "variable", "experiment", "contributor"];

/// `contributor -> leaf payload` (dataset count, or colliding counts).
pub type Contributors = IndexMap<String, PivotNode>;
pub type Experiments = IndexMap<String, Contributors>;
pub type Variables = IndexMap<String, Experiments>;
pub type Tables = IndexMap<String, Variables>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CoverageTree {
    tables: Tables,
}

impl CoverageTree {
    /// Validates `node` and copies it into the typed four-level form.
    pub fn from_node(node: &PivotNode) -> Result<Self> {
        let node = fold_collisions(node, COVERAGE_DEPTH);
        let mut path: Vec<&str> = Vec::with_capacity(COVERAGE_DEPTH);
        let mut tables = Tables::new();

        for (table_id, variables_node) in expect_branch(&node, &path, 0)? {
            path.push(table_id);
            let mut variables = Variables::new();
            for (var_id, experiments_node) in expect_branch(variables_node, &path, 1)? {
                path.push(var_id);
                let mut experiments = Experiments::new();
                for (exp_id, contributors_node) in expect_branch(experiments_node, &path, 2)? {
                    path.push(exp_id);
                    let contributors = expect_branch(contributors_node, &path, 3)?;
                    for (contributor, leaf) in contributors {
                        path.push(contributor);
                        expect_leaf(leaf, &path)?;
                        path.pop();
                    }
                    experiments.insert(exp_id.clone(), contributors.clone());
                    path.pop();
                }
                variables.insert(var_id.clone(), experiments);
                path.pop();
            }
            tables.insert(table_id.clone(), variables);
            path.pop();
        }

        Ok(CoverageTree { tables })
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn variables(&self, table_id: &str) -> Option<&Variables> {
        self.tables.get(table_id)
    }

    pub fn experiments(&self, table_id: &str, var_id: &str) -> Option<&Experiments> {
        self.variables(table_id).and_then(|variables| variables.get(var_id))
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TryFrom<&PivotNode> for CoverageTree {
    type Error = CoverageError;

    fn try_from(node: &PivotNode) -> Result<Self> {
        CoverageTree::from_node(node)
    }
}

/// Copies `node`, merging every list of colliding mappings found where one
/// of the `levels` mapping levels is expected. Lists holding anything other
/// than mappings are kept for validation to reject.
fn fold_collisions(node: &PivotNode, levels: usize) -> PivotNode {
    let folded = match node {
        PivotNode::Many(items) if levels > 0 && items.iter().all(|item| item.as_branch().is_some()) => {
            items.iter().cloned().fold(PivotNode::empty(), PivotNode::merge)
        }
        other => other.clone(),
    };

    match folded {
        PivotNode::Branch(branch) if levels > 1 => PivotNode::Branch(
            branch
                .into_iter()
                .map(|(key, child)| {
                    let child = fold_collisions(&child, levels - 1);
                    (key, child)
                })
                .collect(),
        ),
        other => other,
    }
}

/// The mapping at `level`, or a shape error naming what was found instead.
fn expect_branch<'a>(node: &'a PivotNode, path: &[&str], level: usize) -> Result<&'a Branch> {
    node.as_branch().ok_or_else(|| {
        let expected = match LEVEL_NAMES.get(level) {
            Some(name) => format!("a {} mapping", name),
            None => "a mapping".to_string(),
        };
        CoverageError::shape(path, expected, describe(node))
    })
}

fn expect_leaf(node: &PivotNode, path: &[&str]) -> Result<()> {
    match node {
        PivotNode::Leaf(_) => Ok(()),
        PivotNode::Many(items) if items.iter().all(PivotNode::is_leaf) => Ok(()),
        other => Err(CoverageError::shape(path, "a contributor leaf", describe(other))),
    }
}

pub(crate) fn describe(node: &PivotNode) -> &'static str {
    match node {
        PivotNode::Leaf(Leaf::Count(_)) => "a count",
        PivotNode::Leaf(Leaf::Record(_)) => "a terminal record",
        PivotNode::Branch(_) => "a mapping",
        PivotNode::Many(_) => "a list of colliding entries",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_pivot::{decode, PivotRecord};

    fn record_tree(depth_records: Vec<PivotRecord>, depth: usize) -> PivotNode {
        decode(&depth_records, depth).unwrap()
    }

    fn four_levels() -> Vec<PivotRecord> {
        vec![PivotRecord::branch(
            "table_id",
            "Amon",
            4,
            vec![PivotRecord::branch(
                "variable_id",
                "tas",
                4,
                vec![PivotRecord::branch(
                    "experiment_id",
                    "historical",
                    4,
                    vec![
                        PivotRecord::leaf("institution_id", "NCAR", 3),
                        PivotRecord::leaf("institution_id", "MOHC", 1),
                    ],
                )],
            )],
        )]
    }

    #[test]
    fn test_builds_typed_tree() {
        let tree = CoverageTree::from_node(&record_tree(four_levels(), 4)).unwrap();
        let contributors = &tree.experiments("Amon", "tas").unwrap()["historical"];
        assert_eq!(contributors.len(), 2);
        assert_eq!(contributors["NCAR"].as_count(), Some(3));
    }

    #[test]
    fn test_empty_node_is_empty_tree() {
        let tree = CoverageTree::try_from(&PivotNode::empty()).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_too_shallow_reports_path() {
        let shallow = record_tree(
            vec![PivotRecord::branch(
                "table_id",
                "Amon",
                1,
                vec![PivotRecord::branch(
                    "variable_id",
                    "tas",
                    1,
                    vec![PivotRecord::leaf("experiment_id", "historical", 1)],
                )],
            )],
            3,
        );
        match CoverageTree::from_node(&shallow).unwrap_err() {
            CoverageError::ShapeMismatch { path, expected, found } => {
                assert_eq!(path, "Amon/tas/historical");
                assert_eq!(expected, "a contributor mapping");
                assert_eq!(found, "a count");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_too_deep_is_rejected() {
        let deep = record_tree(
            vec![PivotRecord::branch("root", "CMIP6", 1, four_levels())],
            5,
        );
        let err = CoverageTree::from_node(&deep).unwrap_err();
        assert!(matches!(err, CoverageError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_scalar_at_root_is_rejected() {
        let err = CoverageTree::from_node(&PivotNode::count(3)).unwrap_err();
        match err {
            CoverageError::ShapeMismatch { path, expected, .. } => {
                assert_eq!(path, "");
                assert_eq!(expected, "a table mapping");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn experiment(name: &str, contributors: &[&str]) -> PivotRecord {
        PivotRecord::branch(
            "experiment_id",
            name,
            1,
            contributors
                .iter()
                .map(|c| PivotRecord::leaf("institution_id", *c, 1))
                .collect(),
        )
    }

    #[test]
    fn test_colliding_experiments_fold_into_one() {
        let records = vec![PivotRecord::branch(
            "table_id",
            "Amon",
            2,
            vec![PivotRecord::branch(
                "variable_id",
                "tas",
                2,
                vec![experiment("historical", &["A"]), experiment("historical", &["B"])],
            )],
        )];
        let node = record_tree(records, 4);
        assert!(matches!(
            node.get_path(&["Amon", "tas", "historical"]),
            Some(PivotNode::Many(_))
        ));

        let tree = CoverageTree::from_node(&node).unwrap();
        let contributors = &tree.experiments("Amon", "tas").unwrap()["historical"];
        let names: Vec<&String> = contributors.keys().collect();
        assert_eq!(names, vec!["A", "B"]);

        let per_experiment = crate::stats::contributors_per_experiment(&tree);
        assert_eq!(per_experiment["Amon"]["tas"]["historical"], 2);
    }

    #[test]
    fn test_colliding_tables_fold_recursively() {
        let table = |var: &str, contributor: &str| {
            PivotRecord::branch(
                "table_id",
                "Amon",
                1,
                vec![PivotRecord::branch(
                    "variable_id",
                    var,
                    1,
                    vec![experiment("historical", &[contributor])],
                )],
            )
        };
        let node = record_tree(vec![table("tas", "A"), table("tas", "B"), table("pr", "A")], 4);

        let tree = CoverageTree::from_node(&node).unwrap();
        let variables = tree.variables("Amon").unwrap();
        assert_eq!(variables.len(), 2);
        assert_eq!(variables["tas"]["historical"].len(), 2);
        assert_eq!(variables["pr"]["historical"].len(), 1);
    }

    #[test]
    fn test_colliding_leaf_where_mapping_expected_is_rejected() {
        let records = vec![PivotRecord::branch(
            "table_id",
            "Amon",
            2,
            vec![PivotRecord::branch(
                "variable_id",
                "tas",
                2,
                vec![
                    PivotRecord::leaf("experiment_id", "historical", 1),
                    PivotRecord::leaf("experiment_id", "historical", 1),
                ],
            )],
        )];
        match CoverageTree::from_node(&record_tree(records, 3)).unwrap_err() {
            CoverageError::ShapeMismatch { path, found, .. } => {
                assert_eq!(path, "Amon/tas/historical");
                assert_eq!(found, "a list of colliding entries");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_colliding_contributor_counts_are_leaves() {
        let mut records = four_levels();
        if let Some(experiments) = records[0].pivot.as_mut().and_then(|v| v[0].pivot.as_mut()) {
            if let Some(contributors) = experiments[0].pivot.as_mut() {
                contributors.push(PivotRecord::leaf("institution_id", "NCAR", 2));
            }
        }
        let tree = CoverageTree::from_node(&record_tree(records, 4)).unwrap();
        let contributors = &tree.experiments("Amon", "tas").unwrap()["historical"];
        assert_eq!(contributors.len(), 2);
        assert!(matches!(contributors["NCAR"], PivotNode::Many(_)));
    }
}
