//! FILENAME: core/facet-pivot/src/definition.rs
//! Pivot Definition - The input records and the decoder configuration.
//!
//! `PivotRecord` mirrors one entry of a Solr `facet_pivot` list. The facet
//! roles are passed explicitly and in order, so the decoder never has to
//! infer what a level means from the strings it carries.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

// ============================================================================
// PIVOT RECORD
// ============================================================================

/// One entry of a facet pivot level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRecord {
    /// Facet name this record's value belongs to.
    pub field: String,

    /// Facet value. Numbers and booleans are normalised to their string form.
    #[serde(deserialize_with = "value_as_string")]
    pub value: String,

    /// Number of documents under this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    /// Next level of the pivot, absent at the deepest level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<Vec<PivotRecord>>,
}

impl PivotRecord {
    /// A record at the deepest level.
    pub fn leaf(field: impl Into<String>, value: impl Into<String>, count: u64) -> Self {
        PivotRecord {
            field: field.into(),
            value: value.into(),
            count: Some(count),
            pivot: None,
        }
    }

    /// A record carrying the next pivot level.
    pub fn branch(
        field: impl Into<String>,
        value: impl Into<String>,
        count: u64,
        pivot: Vec<PivotRecord>,
    ) -> Self {
        PivotRecord {
            field: field.into(),
            value: value.into(),
            count: Some(count),
            pivot: Some(pivot),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.pivot.is_none()
    }
}

fn value_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "unsupported pivot value: {}",
            other
        ))),
    }
}

// ============================================================================
// FACET ROLES
// ============================================================================

/// Ordered facet names, outermost first. The length is the decode depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetRoles(SmallVec<[String; 5]>);

impl FacetRoles {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FacetRoles(roles.into_iter().map(Into::into).collect())
    }

    /// CMIP6 coverage by institution.
    pub fn cmip6_institutions() -> Self {
        Self::new(["table_id", "variable_id", "experiment_id", "institution_id"])
    }

    /// CMIP6 coverage by model (source).
    pub fn cmip6_models() -> Self {
        Self::new(["table_id", "variable_id", "experiment_id", "source_id"])
    }

    /// CMIP5 uses the older facet names.
    pub fn cmip5_institutions() -> Self {
        Self::new(["cmor_table", "variable", "experiment", "institute"])
    }

    /// input4MIPs datasets are keyed by era, target MIP, institution and source.
    pub fn input4mips_datasets() -> Self {
        Self::new(["mip_era", "target_mip_list", "institution_id", "source_id"])
    }

    pub fn dataset_status() -> Self {
        Self::new(["instance_id", "dataset_status"])
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn name_at(&self, level: usize) -> Option<&str> {
        self.0.get(level).map(String::as_str)
    }

    /// Key Solr uses for this pivot under `facet_counts.facet_pivot`.
    pub fn pivot_key(&self) -> String {
        self.0.join(",")
    }

    /// The same roles with one more facet appended (the terminal level of a
    /// field-capturing query).
    pub fn with_terminal(&self, field: impl Into<String>) -> Self {
        let mut roles = self.0.clone();
        roles.push(field.into());
        FacetRoles(roles)
    }
}

// ============================================================================
// DECODER CONFIGURATION
// ============================================================================

/// What the decoder stores at a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TerminalMode {
    /// The leaf payload is the record's `count`.
    #[default]
    Count,
    /// The pivot carries one extra level below the key facets. Its records
    /// must name one of these fields and are folded into a single record
    /// keyed by field name.
    Fields(Vec<String>),
}

impl TerminalMode {
    pub fn captures(&self, field: &str) -> bool {
        match self {
            TerminalMode::Count => false,
            TerminalMode::Fields(fields) => fields.iter().any(|f| f == field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Key facets, outermost first.
    pub roles: FacetRoles,

    #[serde(default)]
    pub terminal: TerminalMode,
}

impl DecoderConfig {
    pub fn new(roles: FacetRoles) -> Self {
        DecoderConfig {
            roles,
            terminal: TerminalMode::Count,
        }
    }

    pub fn with_terminal_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terminal = TerminalMode::Fields(fields.into_iter().map(Into::into).collect());
        self
    }
}
