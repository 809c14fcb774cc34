//! FILENAME: core/facet-pivot/src/status.rs
//! Dataset status index built from an `instance_id,dataset_status` pivot.

use indexmap::IndexMap;

use crate::definition::PivotRecord;

/// Status recorded for instances whose pivot entry has no status child.
pub const STATUS_NONE: &str = "None";

/// Leading dot-separated components of an instance id that name its dataset
/// (activity, era, target MIP, institution, source).
pub const DATASET_ID_PARTS: usize = 5;

/// `instance_id -> dataset_status`, in source order.
pub type StatusMap = IndexMap<String, String>;

/// Maps every instance id to the first status value listed under it.
pub fn dataset_statuses(records: &[PivotRecord]) -> StatusMap {
    records
        .iter()
        .map(|record| {
            let status = record
                .pivot
                .as_ref()
                .and_then(|children| children.first())
                .map(|child| child.value.clone())
                .unwrap_or_else(|| STATUS_NONE.to_string());
            (record.value.clone(), status)
        })
        .collect()
}

/// The first `parts` components of an instance id.
pub fn dataset_key(instance_id: &str, parts: usize) -> String {
    instance_id
        .split('.')
        .take(parts)
        .collect::<Vec<_>>()
        .join(".")
}

/// Groups instance statuses by dataset key.
pub fn group_by_dataset(statuses: &StatusMap, parts: usize) -> IndexMap<String, StatusMap> {
    let mut grouped: IndexMap<String, StatusMap> = IndexMap::new();
    for (instance_id, status) in statuses {
        grouped
            .entry(dataset_key(instance_id, parts))
            .or_default()
            .insert(instance_id.clone(), status.clone());
    }
    grouped
}
