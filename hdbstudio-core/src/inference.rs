//! Schema inference from sampled JSON records.
//!
//! HarperDB tables are schemaless, so the column layout is inferred from a
//! bounded sample of records. This module:
//! - discovers fields in first-seen order across the sample
//! - classifies each non-null value and unifies it with what was seen before
//! - rejects shapes a flat table cannot hold (arrays, nested objects)
//! - maps the final types to reporting-tool columns
//!
//! Unification follows the lattice `Null ⊑ {Number | Boolean | GeoPoint} ⊑ String`.
//! Once a field reaches `String` it is never looked at again.

use crate::models::{ColumnSchema, FieldDescriptor, FieldIndex, InferredSchema, Record, TypeTag};
use crate::{Result, error::HdbStudioError, pointer};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Infers the schema of a record sample.
///
/// # Errors
/// Returns [`HdbStudioError::UnsupportedShape`] naming the first field that
/// holds an array, a nested object or a non-point GeoJSON construct. No
/// partial schema is returned.
///
/// # Example
/// ```rust
/// use hdbstudio_core::inference::infer_schema;
/// use hdbstudio_core::models::TypeTag;
/// use serde_json::json;
///
/// let records: Vec<_> = [json!({"a": 1}), json!({"a": "x"})]
///     .into_iter()
///     .filter_map(|v| v.as_object().cloned())
///     .collect();
/// let inferred = infer_schema(&records)?;
/// assert_eq!(inferred.field("a").map(|f| f.type_tag), Some(TypeTag::String));
/// # Ok::<(), hdbstudio_core::HdbStudioError>(())
/// ```
pub fn infer_schema(records: &[Record]) -> Result<InferredSchema> {
    let mut inferrer = SchemaInferrer::new();
    for record in records {
        inferrer.analyze_record(record)?;
    }
    Ok(inferrer.finalize())
}

/// Incremental schema inferrer.
///
/// Feed records with [`analyze_record`](Self::analyze_record) and call
/// [`finalize`](Self::finalize) once the sample is exhausted. After an error
/// the inferrer should be discarded.
#[derive(Debug, Default)]
pub struct SchemaInferrer {
    /// Fields in first-seen order
    fields: Vec<FieldDescriptor>,
    /// Field name -> position in `fields`
    field_index: FieldIndex,
    /// Number of records analyzed
    record_count: u32,
}

impl SchemaInferrer {
    /// Creates a new schema inferrer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzes one record, registering new fields and unifying types.
    ///
    /// # Errors
    /// Returns an unsupported shape error for arrays, nested objects and
    /// GeoJSON constructs other than a `Feature` wrapping a `Point`.
    pub fn analyze_record(&mut self, record: &Record) -> Result<()> {
        self.record_count = self.record_count.saturating_add(1);

        for (key, value) in record {
            let field = self.field_entry(key);

            if field.type_tag.is_absorbing() || value.is_null() {
                continue;
            }

            let observed = classify(key, value)?;
            let unified = field.type_tag.unify(observed);
            if unified != field.type_tag {
                tracing::trace!(
                    "Field '{}' changed from {} to {} (observed {})",
                    key,
                    field.type_tag,
                    unified,
                    observed
                );
                field.type_tag = unified;
            }
        }

        Ok(())
    }

    /// Returns the descriptor for `name`, appending it on first sight.
    fn field_entry(&mut self, name: &str) -> &mut FieldDescriptor {
        let position = match self.field_index.position(name) {
            Some(position) => position,
            None => {
                let position = self.fields.len();
                self.fields.push(FieldDescriptor {
                    name: name.to_string(),
                    type_tag: TypeTag::Null,
                    path: pointer::build([name]),
                });
                self.field_index.insert(name.to_string(), position);
                position
            }
        };
        &mut self.fields[position]
    }

    /// Number of records analyzed so far.
    pub fn record_count(&self) -> u32 {
        self.record_count
    }

    /// Finalizes inference into fields, index and output columns.
    ///
    /// Every field becomes a dimension; the synthetic record-count metric is
    /// appended last.
    pub fn finalize(self) -> InferredSchema {
        let mut schema: Vec<ColumnSchema> = self.fields.iter().map(ColumnSchema::from).collect();
        schema.push(ColumnSchema::record_count());

        tracing::debug!(
            "Inferred {} fields from {} sampled records",
            self.fields.len(),
            self.record_count
        );

        InferredSchema {
            fields: self.fields,
            field_index: self.field_index,
            schema,
        }
    }
}

/// Classifies one non-null value.
fn classify(field: &str, value: &Value) -> Result<TypeTag> {
    match value {
        Value::Null => Ok(TypeTag::Null),
        Value::Bool(_) => Ok(TypeTag::Boolean),
        Value::Number(_) => Ok(TypeTag::Number),
        Value::String(text) if is_lat_long(text) => Ok(TypeTag::GeoPoint),
        Value::String(_) => Ok(TypeTag::String),
        Value::Array(_) => Err(HdbStudioError::unsupported_shape(field, "array")),
        Value::Object(map) => classify_object(field, map),
    }
}

fn classify_object(field: &str, map: &Map<String, Value>) -> Result<TypeTag> {
    match map.get("type").and_then(Value::as_str) {
        Some("Feature") => match geometry_type(map) {
            Some("Point") => Ok(TypeTag::GeoPoint),
            Some(other) => Err(HdbStudioError::unsupported_shape(
                field,
                format!("GeoJSON Feature with {} geometry", other),
            )),
            None => Err(HdbStudioError::unsupported_shape(
                field,
                "GeoJSON Feature without geometry",
            )),
        },
        Some("FeatureCollection") => Err(HdbStudioError::unsupported_shape(
            field,
            "GeoJSON FeatureCollection",
        )),
        _ => Err(HdbStudioError::unsupported_shape(field, "nested object")),
    }
}

fn geometry_type(feature: &Map<String, Value>) -> Option<&str> {
    feature
        .get("geometry")
        .and_then(|geometry| geometry.get("type"))
        .and_then(Value::as_str)
}

/// Coordinates of a GeoJSON `Feature` wrapping a `Point`, if `value` is one.
pub(crate) fn point_feature_coordinates(value: &Value) -> Option<&[Value]> {
    let feature = value.as_object()?;
    if feature.get("type").and_then(Value::as_str) != Some("Feature")
        || geometry_type(feature) != Some("Point")
    {
        return None;
    }
    feature
        .get("geometry")?
        .get("coordinates")?
        .as_array()
        .map(Vec::as_slice)
}

/// Matches `"lat,long"` pairs such as `"-33.86,151.2"` or `"40, -74"`.
fn is_lat_long(text: &str) -> bool {
    static LAT_LONG: OnceLock<Regex> = OnceLock::new();
    LAT_LONG
        .get_or_init(|| {
            #[allow(clippy::expect_used)]
            Regex::new(r"^[+-]?[0-9]+(?:\.[0-9]+)?,\s*[+-]?[0-9]+(?:\.[0-9]+)?$")
                .expect("Invalid lat,long pattern")
        })
        .is_match(text)
}
