//! FILENAME: core/coverage-engine/src/catalog.rs
//! input4MIPs Catalog - Per-dataset records joined from captured-field pivots.
//!
//! The input4MIPs report queries the same four key facets several times,
//! each time capturing one extra field at the leaf (`target_mip_list`,
//! `dataset_category`, `source_version`). Merged with `PivotNode::merge`,
//! those trees carry one record per dataset. Joined with the dataset status
//! index they give the catalog entries.

use facet_pivot::{PivotNode, StatusMap, TerminalValue};
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{CoverageError, Result};
use crate::tree::describe;

pub const TARGET_MIP_FIELD: &str = "target_mip_list";
pub const DATASET_CATEGORY_FIELD: &str = "dataset_category";
pub const SOURCE_VERSION_FIELD: &str = "source_version";

/// Catalog levels, outermost first.
const CATALOG_LEVELS: [&str; 4] = ["mip_era", "target_mip", "institution_id", "source_id"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub institution_id: String,
    pub source_id: String,
    pub mip_table: TerminalValue,
    pub datatype: TerminalValue,
    pub version: TerminalValue,
    /// `instance_id -> dataset_status` for every instance of this dataset.
    pub id: StatusMap,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub data: IndexMap<String, CatalogEntry>,
}

/// Builds one entry per dataset of `datasets` that has published instances.
///
/// `datasets` is `mip_era -> target_mip -> institution_id -> source_id ->
/// record`; `statuses` is the status index grouped by dataset id
/// (`activity.mip_era.target_mip.institution_id.source_id`).
pub fn build_catalog(
    activity_id: &str,
    datasets: &PivotNode,
    statuses: &IndexMap<String, StatusMap>,
) -> Result<Catalog> {
    let mut catalog = Catalog::default();
    let mut path: Vec<&str> = Vec::with_capacity(CATALOG_LEVELS.len());

    for (mip_era, targets) in catalog_level(datasets, &path, 0)? {
        path.push(mip_era);
        for (target_mip, institutions) in catalog_level(targets, &path, 1)? {
            path.push(target_mip);
            for (institution_id, sources) in catalog_level(institutions, &path, 2)? {
                path.push(institution_id);
                for (source_id, leaf) in catalog_level(sources, &path, 3)? {
                    let dataset_id = [
                        activity_id,
                        mip_era.as_str(),
                        target_mip.as_str(),
                        institution_id.as_str(),
                        source_id.as_str(),
                    ]
                    .join(".");
                    let Some(instances) = statuses.get(&dataset_id) else {
                        continue;
                    };

                    path.push(source_id);
                    let record = leaf.as_record().ok_or_else(|| {
                        CoverageError::shape(&path, "a captured field record", describe(leaf))
                    })?;
                    path.pop();

                    let field = |name: &str| {
                        record.get(name).cloned().ok_or_else(|| CoverageError::MissingAttribute {
                            dataset: dataset_id.clone(),
                            field: name.to_string(),
                        })
                    };
                    let entry = CatalogEntry {
                        institution_id: institution_id.clone(),
                        source_id: source_id.clone(),
                        mip_table: field(TARGET_MIP_FIELD)?,
                        datatype: field(DATASET_CATEGORY_FIELD)?,
                        version: field(SOURCE_VERSION_FIELD)?,
                        id: instances.clone(),
                    };
                    catalog.data.insert(dataset_id, entry);
                }
                path.pop();
            }
            path.pop();
        }
        path.pop();
    }

    Ok(catalog)
}

fn catalog_level<'a>(
    node: &'a PivotNode,
    path: &[&str],
    level: usize,
) -> Result<&'a facet_pivot::Branch> {
    node.as_branch().ok_or_else(|| {
        CoverageError::shape(path, format!("a {} mapping", CATALOG_LEVELS[level]), describe(node))
    })
}
