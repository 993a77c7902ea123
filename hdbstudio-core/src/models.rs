//! Core data models for inferred schemas and projected tables.
//!
//! Records arrive as insertion-ordered JSON maps, so field order derived
//! from them is reproducible. Everything produced from a record sample is
//! serializable so a host can persist it between schema and data requests.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A single record returned by the remote database, keys in response order.
pub type Record = serde_json::Map<String, Value>;

/// Name of the synthetic metric column appended to every schema.
pub const RECORD_COUNT_FIELD: &str = "record_count";

/// Inferred type of a record field.
///
/// The tags form a lattice `Null ⊑ {Number | Boolean | GeoPoint} ⊑ String`;
/// `String` is absorbing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeTag {
    /// Only null values observed so far
    #[default]
    Null,
    /// Free text, or the result of a type conflict
    String,
    /// JSON number
    Number,
    /// JSON boolean
    Boolean,
    /// `"lat,long"` text or a GeoJSON `Feature` wrapping a `Point`
    #[serde(rename = "geojson-point")]
    GeoPoint,
}

impl TypeTag {
    /// Joins the current tag with a newly observed one.
    ///
    /// `Null` adopts whatever was observed, equal tags are kept and any
    /// conflict promotes to `String`, which never changes afterwards.
    pub fn unify(self, observed: TypeTag) -> TypeTag {
        match (self, observed) {
            (TypeTag::String, _) => TypeTag::String,
            (TypeTag::Null, observed) => observed,
            (current, TypeTag::Null) => current,
            (current, observed) if current == observed => current,
            _ => TypeTag::String,
        }
    }

    /// Whether no further observation can change this tag.
    pub fn is_absorbing(self) -> bool {
        self == TypeTag::String
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeTag::Null => write!(f, "null"),
            TypeTag::String => write!(f, "string"),
            TypeTag::Number => write!(f, "number"),
            TypeTag::Boolean => write!(f, "boolean"),
            TypeTag::GeoPoint => write!(f, "geojson-point"),
        }
    }
}

/// A field discovered in the record sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    /// Pointer path addressing the field inside a record
    pub path: String,
}

/// Position of each field in the ordered field list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldIndex {
    positions: HashMap<String, usize>,
}

impl FieldIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from an ordered field list.
    pub fn from_fields(fields: &[FieldDescriptor]) -> Self {
        let positions = fields
            .iter()
            .enumerate()
            .map(|(position, field)| (field.name.clone(), position))
            .collect();
        Self { positions }
    }

    /// Looks up the position of a field by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub(crate) fn insert(&mut self, name: String, position: usize) {
        self.positions.insert(name, position);
    }

    /// Number of indexed fields.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Column data type understood by the reporting tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Number,
    Boolean,
    String,
}

/// Reporting concept of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConceptType {
    /// Groupable attribute
    Dimension,
    /// Aggregatable numeric value
    Metric,
}

/// Semantic annotation attached to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemanticType {
    /// Rendered as a `"lat,long"` string
    LatitudeLongitude,
    Number,
}

/// Default aggregation the reporting tool applies to a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationType {
    Sum,
}

/// Concept and semantic annotations of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSemantics {
    pub concept_type: ConceptType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<SemanticType>,
}

/// One output column as described to the reporting tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    pub name: String,
    pub label: String,
    pub data_type: DataType,
    pub semantics: ColumnSemantics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_aggregation_type: Option<AggregationType>,
}

impl ColumnSchema {
    /// The synthetic per-row count metric.
    ///
    /// Every projected row carries `1` in this column, so summing it yields
    /// the number of records.
    pub fn record_count() -> Self {
        Self {
            name: RECORD_COUNT_FIELD.to_string(),
            label: "Record Count".to_string(),
            data_type: DataType::Number,
            semantics: ColumnSemantics {
                concept_type: ConceptType::Metric,
                semantic_type: Some(SemanticType::Number),
            },
            default_aggregation_type: Some(AggregationType::Sum),
        }
    }

    /// Whether this column is the synthetic count metric.
    pub fn is_record_count(&self) -> bool {
        self.name == RECORD_COUNT_FIELD && self.semantics.concept_type == ConceptType::Metric
    }
}

impl From<&FieldDescriptor> for ColumnSchema {
    fn from(field: &FieldDescriptor) -> Self {
        let (data_type, semantic_type) = match field.type_tag {
            TypeTag::Number => (DataType::Number, None),
            TypeTag::Boolean => (DataType::Boolean, None),
            TypeTag::String => (DataType::String, None),
            TypeTag::GeoPoint => (DataType::String, Some(SemanticType::LatitudeLongitude)),
            // never observed with a value
            TypeTag::Null => (DataType::String, None),
        };

        Self {
            name: field.name.clone(),
            label: field.name.clone(),
            data_type,
            semantics: ColumnSemantics {
                concept_type: ConceptType::Dimension,
                semantic_type,
            },
            default_aggregation_type: None,
        }
    }
}

/// Result of one inference pass over a record sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredSchema {
    pub fields: Vec<FieldDescriptor>,
    pub field_index: FieldIndex,
    pub schema: Vec<ColumnSchema>,
}

impl InferredSchema {
    /// Looks up a sampled field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.field_index
            .position(name)
            .and_then(|position| self.fields.get(position))
    }

    /// Names of all output columns, synthetic count included.
    pub fn column_names(&self) -> Vec<&str> {
        self.schema.iter().map(|column| column.name.as_str()).collect()
    }
}

/// One projected row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    pub values: Vec<Value>,
}

/// Projected result set in the reporting tool's data response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub schema: Vec<ColumnSchema>,
    pub rows: Vec<DataRow>,
}

impl DataTable {
    /// Number of projected rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
