//! FILENAME: core/facet-pivot/src/node.rs
//! Pivot Node - The decoded tree.
//!
//! A `PivotNode` is either a leaf payload, a branch keyed by facet value, or
//! the accumulation of several entries that collided on the same key.
//! Serialises to plain JSON: counts as numbers, branches and records as
//! objects, collisions as arrays.

use indexmap::IndexMap;
use serde::Serialize;

/// Ordered mapping from facet value to subtree.
pub type Branch = IndexMap<String, PivotNode>;

/// Terminal fields captured at a leaf, keyed by field name.
pub type TerminalRecord = IndexMap<String, TerminalValue>;

// ============================================================================
// LEAVES
// ============================================================================

/// A captured terminal field value. Repeated fields accumulate into a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TerminalValue {
    One(String),
    Many(Vec<String>),
}

impl TerminalValue {
    /// Appends a value, turning a single value into a list.
    pub fn push(&mut self, value: String) {
        match self {
            TerminalValue::One(existing) => {
                let first = std::mem::take(existing);
                *self = TerminalValue::Many(vec![first, value]);
            }
            TerminalValue::Many(values) => values.push(value),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            TerminalValue::One(value) => vec![value.as_str()],
            TerminalValue::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values().contains(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Leaf {
    Count(u64),
    Record(TerminalRecord),
}

// ============================================================================
// PIVOT NODE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PivotNode {
    Leaf(Leaf),
    Branch(Branch),
    /// Entries that arrived under an already-used key, in arrival order.
    Many(Vec<PivotNode>),
}

impl Default for PivotNode {
    fn default() -> Self {
        PivotNode::empty()
    }
}

impl PivotNode {
    /// An empty branch, the decoding of an empty pivot level.
    pub fn empty() -> Self {
        PivotNode::Branch(IndexMap::new())
    }

    pub fn count(count: u64) -> Self {
        PivotNode::Leaf(Leaf::Count(count))
    }

    pub fn record(record: TerminalRecord) -> Self {
        PivotNode::Leaf(Leaf::Record(record))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, PivotNode::Leaf(_))
    }

    pub fn as_branch(&self) -> Option<&Branch> {
        match self {
            PivotNode::Branch(branch) => Some(branch),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            PivotNode::Leaf(Leaf::Count(count)) => Some(*count),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&TerminalRecord> {
        match self {
            PivotNode::Leaf(Leaf::Record(record)) => Some(record),
            _ => None,
        }
    }

    /// Child under `key`, if this node is a branch.
    pub fn get(&self, key: &str) -> Option<&PivotNode> {
        self.as_branch().and_then(|branch| branch.get(key))
    }

    /// Follows a chain of keys from this node.
    pub fn get_path(&self, path: &[&str]) -> Option<&PivotNode> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Number of nested mapping levels. Leaves have depth 0; an empty branch
    /// still counts as one level.
    pub fn depth(&self) -> usize {
        match self {
            PivotNode::Leaf(_) => 0,
            PivotNode::Branch(branch) => {
                1 + branch.values().map(PivotNode::depth).max().unwrap_or(0)
            }
            PivotNode::Many(items) => items.iter().map(PivotNode::depth).max().unwrap_or(0),
        }
    }

    /// Merges a tree decoded over the same key facets into this one.
    ///
    /// Branches merge key by key; records take the union of their fields,
    /// accumulating differing values for the same field. Any other pair of
    /// payloads meeting on one key is kept side by side as `Many`.
    pub fn merge(self, other: PivotNode) -> PivotNode {
        match (self, other) {
            (PivotNode::Branch(mut left), PivotNode::Branch(right)) => {
                for (key, node) in right {
                    match left.get_mut(&key) {
                        Some(existing) => {
                            let current = std::mem::take(existing);
                            *existing = current.merge(node);
                        }
                        None => {
                            left.insert(key, node);
                        }
                    }
                }
                PivotNode::Branch(left)
            }
            (PivotNode::Leaf(Leaf::Record(mut left)), PivotNode::Leaf(Leaf::Record(right))) => {
                for (field, value) in right {
                    match left.get_mut(&field) {
                        Some(existing) => {
                            for v in value.values() {
                                if !existing.contains(v) {
                                    existing.push(v.to_string());
                                }
                            }
                        }
                        None => {
                            left.insert(field, value);
                        }
                    }
                }
                PivotNode::record(left)
            }
            (left, right) => {
                let mut items = match left {
                    PivotNode::Many(items) => items,
                    single => vec![single],
                };
                match right {
                    PivotNode::Many(more) => items.extend(more),
                    single => items.push(single),
                }
                PivotNode::Many(items)
            }
        }
    }
}

/// Inserts `node` under `key`, accumulating into a list when the key is
/// already present instead of overwriting it.
pub fn insert_accumulating(branch: &mut Branch, key: String, node: PivotNode) {
    match branch.get_mut(&key) {
        Some(PivotNode::Many(items)) => items.push(node),
        Some(existing) => {
            let first = std::mem::take(existing);
            *existing = PivotNode::Many(vec![first, node]);
        }
        None => {
            branch.insert(key, node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn branch(entries: Vec<(&str, PivotNode)>) -> PivotNode {
        PivotNode::Branch(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    #[test]
    fn test_insert_accumulating_wraps_then_appends() {
        let mut level = Branch::new();
        insert_accumulating(&mut level, "A".to_string(), PivotNode::count(5));
        insert_accumulating(&mut level, "A".to_string(), PivotNode::count(7));
        insert_accumulating(&mut level, "A".to_string(), PivotNode::count(9));

        let json = serde_json::to_value(PivotNode::Branch(level)).unwrap();
        assert_eq!(json, json!({"A": [5, 7, 9]}));
    }

    #[test]
    fn test_depth_counts_mapping_levels() {
        let tree = branch(vec![(
            "Amon",
            branch(vec![("tas", branch(vec![("A", PivotNode::count(1))]))]),
        )]);
        assert_eq!(tree.depth(), 3);
        assert_eq!(PivotNode::empty().depth(), 1);
        assert_eq!(PivotNode::count(3).depth(), 0);
    }

    #[test]
    fn test_get_path() {
        let tree = branch(vec![("Amon", branch(vec![("tas", PivotNode::count(4))]))]);
        assert_eq!(tree.get_path(&["Amon", "tas"]).and_then(PivotNode::as_count), Some(4));
        assert!(tree.get_path(&["Amon", "pr"]).is_none());
        assert!(tree.get_path(&["Amon", "tas", "deeper"]).is_none());
    }

    #[test]
    fn test_terminal_value_push() {
        let mut value = TerminalValue::One("CMIP".to_string());
        value.push("ScenarioMIP".to_string());
        assert_eq!(value.values(), vec!["CMIP", "ScenarioMIP"]);
        value.push("DAMIP".to_string());
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!(["CMIP", "ScenarioMIP", "DAMIP"])
        );
    }

    #[test]
    fn test_merge_unions_records_under_shared_keys() {
        let mut category = TerminalRecord::new();
        category.insert(
            "dataset_category".to_string(),
            TerminalValue::One("emissions".to_string()),
        );
        let mut version = TerminalRecord::new();
        version.insert(
            "source_version".to_string(),
            TerminalValue::One("1.0".to_string()),
        );

        let left = branch(vec![("CMIP6", branch(vec![("src", PivotNode::record(category))]))]);
        let right = branch(vec![
            ("CMIP6", branch(vec![("src", PivotNode::record(version))])),
            ("CMIP7", PivotNode::empty()),
        ]);

        let merged = left.merge(right);
        assert_eq!(
            serde_json::to_value(&merged).unwrap(),
            json!({
                "CMIP6": {"src": {"dataset_category": "emissions", "source_version": "1.0"}},
                "CMIP7": {}
            })
        );
    }

    #[test]
    fn test_merge_keeps_branch_order() {
        let left = branch(vec![("a", PivotNode::empty()), ("b", PivotNode::empty())]);
        let right = branch(vec![("a", PivotNode::empty()), ("c", PivotNode::empty())]);
        let merged = left.merge(right);
        let keys: Vec<&String> = merged.as_branch().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_records_does_not_duplicate_equal_values() {
        let mut left = TerminalRecord::new();
        left.insert("target_mip_list".to_string(), TerminalValue::One("CMIP".to_string()));
        let mut right = TerminalRecord::new();
        right.insert(
            "target_mip_list".to_string(),
            TerminalValue::Many(vec!["CMIP".to_string(), "DAMIP".to_string()]),
        );

        let merged = PivotNode::record(left).merge(PivotNode::record(right));
        assert_eq!(
            serde_json::to_value(&merged).unwrap(),
            json!({"target_mip_list": ["CMIP", "DAMIP"]})
        );
    }

    #[test]
    fn test_merge_flattens_colliding_lists() {
        let left = PivotNode::Many(vec![PivotNode::count(1), PivotNode::count(2)]);
        let right = PivotNode::Many(vec![PivotNode::count(3), PivotNode::count(4)]);
        let merged = left.merge(right);
        assert_eq!(serde_json::to_value(&merged).unwrap(), json!([1, 2, 3, 4]));

        let merged = PivotNode::count(1).merge(PivotNode::Many(vec![PivotNode::count(2), PivotNode::count(3)]));
        assert_eq!(serde_json::to_value(&merged).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn test_merge_mismatched_payloads_accumulate() {
        let merged = PivotNode::count(1).merge(PivotNode::count(2));
        assert_eq!(serde_json::to_value(&merged).unwrap(), json!([1, 2]));
    }
}
