//! FILENAME: core/facet-pivot/src/response.rs
//! Locates the pivot record list inside a Solr JSON response.

use serde::Deserialize;
use serde_json::Value;

use crate::definition::{FacetRoles, PivotRecord};
use crate::error::{DecodeError, Result};

/// Returns the records stored under `facet_counts.facet_pivot`.
///
/// The entry keyed by `roles.pivot_key()` is preferred. Solr keys the pivot by
/// the requested field list, so when exactly one pivot is present it is used
/// regardless of its key.
pub fn extract_pivot(document: &Value, roles: &FacetRoles) -> Result<Vec<PivotRecord>> {
    let pivots = document
        .get("facet_counts")
        .and_then(|counts| counts.get("facet_pivot"))
        .and_then(Value::as_object)
        .ok_or_else(|| {
            DecodeError::MissingFacetPivot("response has no facet_counts.facet_pivot".to_string())
        })?;

    let key = roles.pivot_key();
    let raw = match pivots.get(&key) {
        Some(raw) => raw,
        None if pivots.len() == 1 => pivots
            .values()
            .next()
            .ok_or_else(|| DecodeError::MissingFacetPivot(key.clone()))?,
        None => return Err(DecodeError::MissingFacetPivot(key)),
    };

    Ok(Vec::<PivotRecord>::deserialize(raw)?)
}

/// Parses a raw response body and extracts its pivot.
pub fn parse_response(body: &str, roles: &FacetRoles) -> Result<Vec<PivotRecord>> {
    let document: Value = serde_json::from_str(body)?;
    extract_pivot(&document, roles)
}
