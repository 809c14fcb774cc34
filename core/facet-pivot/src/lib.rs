//! FILENAME: core/facet-pivot/src/lib.rs
//! Facet pivot decoding for the ESGF coverage reports.
//!
//! Solr answers a `facet.pivot` query with a recursive list of records, each
//! labelled with the facet name, the facet value, a count and (except at the
//! deepest level) the next level of records. This crate turns that encoding
//! into a nested, insertion-ordered value tree.
//!
//! Layers:
//! - `definition`: Input records and decoder configuration (WHAT we read)
//! - `node`: The decoded tree (WHAT we produce)
//! - `decoder`: The recursive decode (HOW we build it)
//! - `response`: Locating the pivot inside a Solr response document
//! - `status`: Per-dataset status index from an `instance_id,dataset_status` pivot

pub mod definition;
pub mod node;
pub mod decoder;
pub mod response;
pub mod status;
mod error;

pub use definition::*;
pub use node::*;
pub use decoder::{decode, PivotDecoder};
pub use error::{DecodeError, Result};
pub use response::{extract_pivot, parse_response};
pub use status::{dataset_key, dataset_statuses, group_by_dataset, StatusMap, DATASET_ID_PARTS, STATUS_NONE};
