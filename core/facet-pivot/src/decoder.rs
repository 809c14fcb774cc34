//! FILENAME: core/facet-pivot/src/decoder.rs
//! Pivot Decoder - Turns a facet pivot record list into a `PivotNode` tree.
//!
//! Algorithm (per level, siblings in source order):
//! 1. A record carrying `pivot` becomes a branch: `tree[value] = decode(pivot)`
//! 2. A leaf record becomes its `count` (count mode)
//! 3. In field-capturing mode the level below the key facets is folded into
//!    one record keyed by `field`
//! 4. A value already present at the level accumulates into a list

use crate::definition::{DecoderConfig, FacetRoles, PivotRecord, TerminalMode};
use crate::error::{DecodeError, Result};
use crate::node::{insert_accumulating, Branch, PivotNode, TerminalRecord, TerminalValue};

/// Decodes `records` as a count-mode pivot of exactly `depth` levels.
pub fn decode(records: &[PivotRecord], depth: usize) -> Result<PivotNode> {
    let mut path = Vec::new();
    decode_counts(records, depth, &mut path)
}

/// Decoder bound to a set of facet roles and a terminal mode.
#[derive(Debug, Clone)]
pub struct PivotDecoder {
    config: DecoderConfig,
}

impl PivotDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        PivotDecoder { config }
    }

    /// Count-mode decoder over `roles`.
    pub fn counting(roles: FacetRoles) -> Self {
        Self::new(DecoderConfig::new(roles))
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn decode(&self, records: &[PivotRecord]) -> Result<PivotNode> {
        let depth = self.config.roles.depth();
        let mut path = Vec::new();
        match &self.config.terminal {
            TerminalMode::Count => decode_counts(records, depth, &mut path),
            TerminalMode::Fields(_) => self.decode_fields(records, depth, &mut path),
        }
    }

    fn decode_fields(
        &self,
        records: &[PivotRecord],
        remaining: usize,
        path: &mut Vec<String>,
    ) -> Result<PivotNode> {
        if remaining == 0 {
            return self.fold_terminal(records, path);
        }

        let mut level = Branch::new();
        for record in records {
            path.push(record.value.clone());
            let child = match &record.pivot {
                Some(children) => self.decode_fields(children, remaining - 1, path)?,
                None => {
                    return Err(DecodeError::malformed(
                        path,
                        format!(
                            "record for '{}' ends {} level(s) above the captured fields",
                            record.field, remaining
                        ),
                    ));
                }
            };
            path.pop();
            insert_accumulating(&mut level, record.value.clone(), child);
        }
        Ok(PivotNode::Branch(level))
    }

    fn fold_terminal(&self, records: &[PivotRecord], path: &mut Vec<String>) -> Result<PivotNode> {
        let mut captured = TerminalRecord::new();
        for record in records {
            if record.pivot.is_some() {
                path.push(record.value.clone());
                return Err(DecodeError::malformed(
                    path,
                    "captured field record carries a nested pivot",
                ));
            }
            if !self.config.terminal.captures(&record.field) {
                path.push(record.value.clone());
                return Err(DecodeError::malformed(
                    path,
                    format!("field '{}' is not a captured terminal field", record.field),
                ));
            }
            match captured.get_mut(&record.field) {
                Some(existing) => existing.push(record.value.clone()),
                None => {
                    captured.insert(record.field.clone(), TerminalValue::One(record.value.clone()));
                }
            }
        }
        Ok(PivotNode::record(captured))
    }
}

fn decode_counts(records: &[PivotRecord], remaining: usize, path: &mut Vec<String>) -> Result<PivotNode> {
    let mut level = Branch::new();
    for record in records {
        path.push(record.value.clone());
        if remaining == 0 {
            return Err(DecodeError::malformed(path, "no facet levels remain for this record"));
        }
        let child = match &record.pivot {
            Some(_) if remaining == 1 => {
                return Err(DecodeError::malformed(
                    path,
                    format!("record for '{}' nests below the last facet", record.field),
                ));
            }
            Some(children) => decode_counts(children, remaining - 1, path)?,
            None => match record.count {
                Some(count) => PivotNode::count(count),
                None => {
                    return Err(DecodeError::malformed(
                        path,
                        format!("leaf record for '{}' has neither pivot nor count", record.field),
                    ));
                }
            },
        };
        path.pop();
        insert_accumulating(&mut level, record.value.clone(), child);
    }
    Ok(PivotNode::Branch(level))
}
