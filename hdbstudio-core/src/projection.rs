//! Projection of a full record set into reporting-tool rows.

use crate::inference::point_feature_coordinates;
use crate::models::{
    ColumnSchema, DataRow, DataTable, FieldDescriptor, FieldIndex, InferredSchema,
    RECORD_COUNT_FIELD, Record, TypeTag,
};
use crate::{Result, error::HdbStudioError, pointer};
use serde_json::Value;

/// Upper bound on projected rows, whatever the caller asks for.
pub const MAX_ROWS_LIMIT: u32 = 1_000_000;

/// One resolved output column.
enum Column<'a> {
    Field(&'a FieldDescriptor),
    RecordCount,
}

impl Column<'_> {
    fn schema(&self) -> ColumnSchema {
        match self {
            Column::Field(field) => ColumnSchema::from(*field),
            Column::RecordCount => ColumnSchema::record_count(),
        }
    }

    fn value(&self, record: &Record) -> Value {
        match self {
            Column::RecordCount => Value::from(1),
            Column::Field(field) => field_value(field, record),
        }
    }
}

/// Projects `records` onto the requested columns.
///
/// Columns appear in `requested` order. Sampled fields take precedence over
/// the synthetic [`RECORD_COUNT_FIELD`], which is `1` in every row. At most
/// `min(records.len(), max_rows)` rows are produced, with `max_rows` itself
/// capped at [`MAX_ROWS_LIMIT`].
///
/// # Errors
/// Returns a contract violation when a requested name is neither a sampled
/// field nor the record count.
pub fn project<S: AsRef<str>>(
    records: &[Record],
    fields: &[FieldDescriptor],
    field_index: &FieldIndex,
    requested: &[S],
    max_rows: u32,
) -> Result<DataTable> {
    let columns = requested
        .iter()
        .map(|name| resolve_column(fields, field_index, name.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let row_limit = usize::try_from(max_rows.min(MAX_ROWS_LIMIT)).unwrap_or(usize::MAX);
    let rows: Vec<DataRow> = records
        .iter()
        .take(row_limit)
        .map(|record| DataRow {
            values: columns.iter().map(|column| column.value(record)).collect(),
        })
        .collect();

    tracing::debug!(
        "Projected {} of {} records onto {} columns",
        rows.len(),
        records.len(),
        columns.len()
    );

    Ok(DataTable {
        schema: columns.iter().map(Column::schema).collect(),
        rows,
    })
}

impl InferredSchema {
    /// Projects `records` using this schema's fields and index.
    ///
    /// # Errors
    /// See [`project`].
    pub fn project<S: AsRef<str>>(
        &self,
        records: &[Record],
        requested: &[S],
        max_rows: u32,
    ) -> Result<DataTable> {
        project(records, &self.fields, &self.field_index, requested, max_rows)
    }
}

fn resolve_column<'a>(
    fields: &'a [FieldDescriptor],
    field_index: &FieldIndex,
    name: &str,
) -> Result<Column<'a>> {
    if let Some(field) = field_index
        .position(name)
        .and_then(|position| fields.get(position))
    {
        return Ok(Column::Field(field));
    }
    if name == RECORD_COUNT_FIELD {
        return Ok(Column::RecordCount);
    }
    Err(HdbStudioError::contract_violation(format!(
        "requested field '{}' is not part of the inferred schema",
        name
    )))
}

fn field_value(field: &FieldDescriptor, record: &Record) -> Value {
    // schema fields are top-level keys, so no indices are needed
    match pointer::resolve_in_record(record, &field.path, &[]) {
        Some(value) => render(field.type_tag, value),
        None => Value::Null,
    }
}

fn render(type_tag: TypeTag, value: &Value) -> Value {
    if let Some(coordinates) = point_feature_coordinates(value) {
        return Value::String(join_coordinates(coordinates));
    }

    match (type_tag, value) {
        (_, Value::Null) => Value::Null,
        // cells are scalar whatever the column type
        (_, Value::Array(_) | Value::Object(_)) => Value::String(value.to_string()),
        (TypeTag::String | TypeTag::Null | TypeTag::GeoPoint, Value::String(text)) => {
            Value::String(text.clone())
        }
        (TypeTag::String | TypeTag::Null | TypeTag::GeoPoint, other) => {
            Value::String(other.to_string())
        }
        (TypeTag::Number | TypeTag::Boolean, other) => other.clone(),
    }
}

fn join_coordinates(coordinates: &[Value]) -> String {
    coordinates
        .iter()
        .map(|coordinate| match coordinate {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::infer_schema;
    use serde_json::json;

    fn records(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .filter_map(|value| value.as_object().cloned())
            .collect()
    }

    fn column(table: &DataTable, position: usize) -> Vec<Value> {
        table
            .rows
            .iter()
            .map(|row| row.values[position].clone())
            .collect()
    }

    #[test]
    fn test_columns_follow_requested_order() {
        let data = records(vec![json!({"a": 1, "b": "x"}), json!({"a": 2, "b": "y"})]);
        let inferred = infer_schema(&data).unwrap();

        let table = inferred.project(&data, &["b", "a"], 100).unwrap();
        let names: Vec<&str> = table.schema.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(table.rows[0].values, vec![json!("x"), json!(1)]);
        assert_eq!(table.rows[1].values, vec![json!("y"), json!(2)]);
    }

    #[test]
    fn test_record_count_is_one_per_row() {
        let data = records(vec![json!({"a": 1}), json!({}), json!({"a": null})]);
        let inferred = infer_schema(&data).unwrap();

        let table = inferred.project(&data, &[RECORD_COUNT_FIELD], 100).unwrap();
        assert_eq!(column(&table, 0), vec![json!(1), json!(1), json!(1)]);
        assert!(table.schema[0].is_record_count());
    }

    #[test]
    fn test_row_count_is_bounded_by_max_rows() {
        let data = records((0..10).map(|i| json!({ "i": i })).collect());
        let inferred = infer_schema(&data).unwrap();

        assert_eq!(inferred.project(&data, &["i"], 3).unwrap().row_count(), 3);
        assert_eq!(inferred.project(&data, &["i"], 50).unwrap().row_count(), 10);
        assert_eq!(inferred.project(&data, &["i"], 0).unwrap().row_count(), 0);
    }

    #[test]
    fn test_missing_values_are_null() {
        let data = records(vec![json!({"a": 1, "b": "x"}), json!({"a": 2})]);
        let inferred = infer_schema(&data).unwrap();

        let table = inferred.project(&data, &["b"], 100).unwrap();
        assert_eq!(column(&table, 0), vec![json!("x"), Value::Null]);
    }

    #[test]
    fn test_point_feature_renders_as_lat_long_text() {
        let data = records(vec![
            json!({"loc": {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 2]}}}),
            json!({"loc": "3.5,4.25"}),
        ]);
        let inferred = infer_schema(&data).unwrap();
        assert_eq!(inferred.field("loc").map(|f| f.type_tag), Some(TypeTag::GeoPoint));

        let table = inferred.project(&data, &["loc"], 100).unwrap();
        assert_eq!(column(&table, 0), vec![json!("1,2"), json!("3.5,4.25")]);
    }

    #[test]
    fn test_string_fields_coerce_scalars_to_text() {
        let data = records(vec![json!({"v": "x"}), json!({"v": 7}), json!({"v": true})]);
        let inferred = infer_schema(&data).unwrap();

        let table = inferred.project(&data, &["v"], 100).unwrap();
        assert_eq!(column(&table, 0), vec![json!("x"), json!("7"), json!("true")]);
    }

    #[test]
    fn test_null_typed_fields_coerce_later_values() {
        // sampled only as null, but the full set carries numbers
        let sample = records(vec![json!({"v": null})]);
        let inferred = infer_schema(&sample).unwrap();

        let full = records(vec![json!({"v": null}), json!({"v": 12})]);
        let table = inferred.project(&full, &["v"], 100).unwrap();
        assert_eq!(column(&table, 0), vec![Value::Null, json!("12")]);
    }

    #[test]
    fn test_objects_outside_the_sample_render_as_json_text() {
        let sample = records(vec![json!({"v": "x"})]);
        let inferred = infer_schema(&sample).unwrap();

        let full = records(vec![json!({"v": {"k": 1}})]);
        let table = inferred.project(&full, &["v"], 100).unwrap();
        assert_eq!(column(&table, 0), vec![json!("{\"k\":1}")]);
    }

    #[test]
    fn test_nested_values_outside_the_sample_stay_scalar() {
        let sample = records(vec![json!({"n": 1, "b": true})]);
        let inferred = infer_schema(&sample).unwrap();

        let full = records(vec![
            json!({"n": 1, "b": true}),
            json!({"n": [1, 2], "b": {"k": 1}}),
            json!({"n": {"k": 1}, "b": [false]}),
        ]);
        let table = inferred.project(&full, &["n", "b"], 100).unwrap();

        assert_eq!(column(&table, 0), vec![json!(1), json!("[1,2]"), json!("{\"k\":1}")]);
        assert_eq!(column(&table, 1), vec![json!(true), json!("{\"k\":1}"), json!("[false]")]);
        assert!(
            table
                .rows
                .iter()
                .flat_map(|row| &row.values)
                .all(|value| !value.is_array() && !value.is_object())
        );
    }

    #[test]
    fn test_numeric_and_boolean_values_pass_through() {
        let data = records(vec![json!({"n": 1.5, "b": false})]);
        let inferred = infer_schema(&data).unwrap();

        let table = inferred.project(&data, &["n", "b"], 100).unwrap();
        assert_eq!(table.rows[0].values, vec![json!(1.5), json!(false)]);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let data = records(vec![json!({"a": 1})]);
        let inferred = infer_schema(&data).unwrap();

        let result = inferred.project(&data, &["nope"], 100);
        assert!(matches!(
            result,
            Err(HdbStudioError::ContractViolation { .. })
        ));
    }

    #[test]
    fn test_sampled_field_shadows_record_count_name() {
        let data = records(vec![json!({"record_count": 42})]);
        let inferred = infer_schema(&data).unwrap();

        let table = inferred.project(&data, &[RECORD_COUNT_FIELD], 100).unwrap();
        assert_eq!(column(&table, 0), vec![json!(42)]);
        assert!(!table.schema[0].is_record_count());
    }

    #[test]
    fn test_free_function_matches_schema_method() {
        let data = records(vec![json!({"a": 1, "b": "x"})]);
        let inferred = infer_schema(&data).unwrap();
        let requested = vec!["a".to_string(), RECORD_COUNT_FIELD.to_string()];

        let direct =
            project(&data, &inferred.fields, &inferred.field_index, &requested, 10).unwrap();
        let via_schema = inferred.project(&data, &requested, 10).unwrap();
        assert_eq!(direct, via_schema);
    }
}
