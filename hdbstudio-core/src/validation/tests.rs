//! Tests for output validation against the embedded JSON Schemas.

use super::*;
use crate::inference::infer_schema;
use crate::models::Record;
use serde_json::json;

fn setup() {
    initialize_schema_validator().expect("embedded schemas compile");
}

fn records(values: Vec<Value>) -> Vec<Record> {
    values
        .into_iter()
        .filter_map(|value| value.as_object().cloned())
        .collect()
}

fn count_column() -> Value {
    json!({
        "name": "record_count",
        "label": "Record Count",
        "dataType": "NUMBER",
        "semantics": {"conceptType": "METRIC", "semanticType": "NUMBER"},
        "defaultAggregationType": "SUM"
    })
}

#[test]
fn test_initialization_is_repeatable() {
    assert!(initialize_schema_validator().is_ok());
    assert!(initialize_schema_validator().is_ok());
}

#[test]
fn test_schema_definitions_parse() {
    for kind in [OutputKind::Schema, OutputKind::Data] {
        let definition = get_schema_definition(kind).expect("embedded schema parses");
        assert!(definition.get("$defs").is_some());
    }
}

#[test]
fn test_projected_table_passes() {
    setup();
    let data = records(vec![
        json!({"name": "Penny", "loc": "1.5,2.5", "age": 5}),
        json!({"name": "Kato", "loc": "3,4", "age": null}),
    ]);
    let inferred = infer_schema(&data).unwrap();
    let table = inferred
        .project(&data, &["name", "loc", "age", "record_count"], 100)
        .unwrap();

    let value = serde_json::to_value(&table).unwrap();
    assert!(validate_data_output(&value).is_ok());
}

#[test]
fn test_inferred_schema_passes() {
    setup();
    let data = records(vec![json!({"a/b": 1, "flag": true})]);
    let inferred = infer_schema(&data).unwrap();

    let value = serde_json::to_value(&inferred).unwrap();
    assert!(validate_schema_output(&value).is_ok());
}

#[test]
fn test_missing_rows_fails() {
    setup();
    let result = validate_data_output(&json!({"schema": [count_column()]}));
    assert!(matches!(result, Err(ValidationError::ValidationFailed { .. })));
}

#[test]
fn test_bad_data_type_fails() {
    setup();
    let mut column = count_column();
    column["dataType"] = json!("DATE");

    let result = validate_data_output(&json!({"schema": [column], "rows": []}));
    assert!(matches!(result, Err(ValidationError::ValidationFailed { .. })));
}

#[test]
fn test_nested_cell_value_fails() {
    setup();
    let table = json!({"schema": [count_column()], "rows": [{"values": [{"x": 1}]}]});
    assert!(matches!(
        validate_data_output(&table),
        Err(ValidationError::ValidationFailed { .. })
    ));
}

#[test]
fn test_row_width_mismatch_fails() {
    setup();
    let table = json!({
        "schema": [count_column()],
        "rows": [{"values": [1]}, {"values": [1, 2]}]
    });
    match validate_data_output(&table) {
        Err(ValidationError::RowWidthMismatch {
            row,
            expected,
            actual,
        }) => {
            assert_eq!((row, expected, actual), (1, 1, 2));
        }
        other => panic!("expected row width mismatch, got {:?}", other),
    }
}

#[test]
fn test_basic_looking_cell_is_allowed() {
    setup();
    let mut column = count_column();
    column["name"] = json!("note");
    column["dataType"] = json!("STRING");
    let table = json!({
        "schema": [column],
        "rows": [{"values": ["Basic YWRtaW46cGFzc3dvcmQ="]}]
    });

    assert!(validate_data_output(&table).is_ok());
}

#[test]
fn test_short_basic_text_is_allowed() {
    setup();
    let mut column = count_column();
    column["dataType"] = json!("STRING");
    let table = json!({"schema": [column], "rows": [{"values": ["Basic plan"]}]});
    assert!(validate_data_output(&table).is_ok());
}

#[test]
fn test_authorization_column_is_allowed() {
    setup();
    let data = records(vec![json!({"Authorization": "Basic abcdefghijklmnop", "n": 1})]);
    let inferred = infer_schema(&data).unwrap();
    let schema_value = serde_json::to_value(&inferred).unwrap();
    assert!(validate_schema_output(&schema_value).is_ok());

    let table = inferred
        .project(&data, &["Authorization", "n"], 10)
        .unwrap();
    let table_value = serde_json::to_value(&table).unwrap();
    assert!(validate_data_output(&table_value).is_ok());
}

#[test]
fn test_nested_values_outside_sample_pass() {
    setup();
    let data = records(vec![
        json!({"n": 1, "b": true}),
        json!({"n": [1, 2], "b": {"k": 1}}),
    ]);
    let inferred = infer_schema(&data[..1]).unwrap();
    let table = inferred.project(&data, &["n", "b"], 10).unwrap();

    let value = serde_json::to_value(&table).unwrap();
    assert!(validate_data_output(&value).is_ok());
}

#[test]
fn test_authorization_key_in_structure_fails() {
    setup();
    let table = json!({"schema": [count_column()], "rows": [], "authorization": "x"});
    assert!(matches!(
        validate_data_output(&table),
        Err(ValidationError::SecurityViolation { .. })
    ));
}

#[test]
fn test_basic_token_in_structure_fails() {
    setup();
    let mut column = count_column();
    column["semantics"]["note"] = json!("Basic YWRtaW46cGFzc3dvcmQ=");
    let table = json!({"schema": [column], "rows": []});
    assert!(matches!(
        validate_data_output(&table),
        Err(ValidationError::SecurityViolation { .. })
    ));
}

#[test]
fn test_known_secret_is_found_in_cells() {
    let table = json!({
        "schema": [count_column()],
        "rows": [{"values": ["ok"]}, {"values": ["token=YWRtaW46cGFzc3dvcmQ="]}]
    });

    let result = validate_no_secret(&table, "YWRtaW46cGFzc3dvcmQ=");
    match result {
        Err(ValidationError::SecurityViolation { reason }) => {
            assert!(reason.contains("rows[1].values[0]"), "{reason}");
        }
        other => panic!("expected security violation, got {other:?}"),
    }
    assert!(validate_no_secret(&table, "c2VjcmV0").is_ok());
    assert!(validate_no_secret(&table, "").is_ok());
}

#[test]
fn test_known_secret_is_found_in_keys() {
    let value = json!({"fieldIndex": {"c2VjcmV0": 0}});
    assert!(matches!(
        validate_no_secret(&value, "c2VjcmV0"),
        Err(ValidationError::SecurityViolation { .. })
    ));
}

#[test]
fn test_schema_output_requires_pointer_paths() {
    setup();
    let value = json!({
        "fields": [{"name": "a", "type": "number", "path": "a"}],
        "fieldIndex": {"a": 0},
        "schema": [count_column()]
    });
    assert!(validate_schema_output(&value).is_err());
}

#[test]
fn test_validate_and_parse_round_trip() {
    setup();
    let data = records(vec![json!({"a": 1})]);
    let inferred = infer_schema(&data).unwrap();
    let table = inferred.project(&data, &["a"], 10).unwrap();

    let text = serde_json::to_string(&table).unwrap();
    assert_eq!(validate_and_parse_data(&text).unwrap(), table);

    let text = serde_json::to_string(&inferred).unwrap();
    assert_eq!(validate_and_parse_schema(&text).unwrap(), inferred);
}

#[test]
fn test_invalid_json_is_reported() {
    setup();
    assert!(matches!(
        validate_and_parse_data("{not json"),
        Err(ValidationError::JsonParsing { .. })
    ));
}
