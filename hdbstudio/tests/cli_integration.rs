//! Integration tests for the file-backed schema and data commands.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use hdbstudio::cli::{DataArgs, SchemaArgs, SourceArgs};
use hdbstudio::commands;
use hdbstudio_core::models::{DataType, TypeTag};
use hdbstudio_core::validation::{
    initialize_schema_validator, validate_and_parse_data, validate_and_parse_schema,
};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

const DOGS: &str = r#"[
    {"id": 1, "dog_name": "Penny", "age": 5, "location": "37.7749,-122.4194"},
    {"id": 2, "dog_name": "Kato", "age": null, "location": "40.7128, -74.0060"},
    {"id": 3, "dog_name": "Harper", "age": "unknown", "location": "51.5,-0.12"}
]"#;

fn write_input(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("records.json");
    std::fs::write(&path, body).expect("write input");
    path
}

fn table_source() -> SourceArgs {
    SourceArgs {
        sql: None,
        table: Some("dev.dog".to_string()),
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read output")
}

#[tokio::test]
async fn test_integration_schema_command_writes_valid_schema() {
    initialize_schema_validator().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("schema.json");

    let args = SchemaArgs {
        input: write_input(&dir, DOGS),
        source: table_source(),
        sample_size: 100,
        output: Some(output.clone()),
    };
    commands::schema(&args).await.unwrap();

    let inferred = validate_and_parse_schema(&read(&output)).unwrap();
    assert_eq!(
        inferred.column_names(),
        vec!["id", "dog_name", "age", "location", "record_count"]
    );
    assert_eq!(inferred.field("age").map(|f| f.type_tag), Some(TypeTag::String));
    assert_eq!(
        inferred.field("location").map(|f| f.type_tag),
        Some(TypeTag::GeoPoint)
    );
    assert_eq!(inferred.schema[0].data_type, DataType::Number);
}

#[tokio::test]
async fn test_integration_data_command_projects_requested_columns() {
    initialize_schema_validator().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("data.json");

    let args = DataArgs {
        input: write_input(&dir, DOGS),
        source: table_source(),
        fields: vec!["dog_name".into(), "age".into(), "record_count".into()],
        max_rows: 2,
        sample_size: 100,
        output: Some(output.clone()),
    };
    commands::data(&args).await.unwrap();

    let table = validate_and_parse_data(&read(&output)).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.rows[0].values, vec![json!("Penny"), json!("5"), json!(1)]);
    assert_eq!(
        table.rows[1].values,
        vec![json!("Kato"), serde_json::Value::Null, json!(1)]
    );
}

#[tokio::test]
async fn test_integration_unsupported_shape_is_reported() {
    initialize_schema_validator().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("schema.json");

    let args = SchemaArgs {
        input: write_input(&dir, r#"[{"id": 1, "tags": ["good", "dog"]}]"#),
        source: table_source(),
        sample_size: 100,
        output: Some(output.clone()),
    };
    let error = commands::schema(&args).await.unwrap_err();

    assert!(error.to_string().contains("'tags'"));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_integration_unknown_field_is_rejected() {
    initialize_schema_validator().unwrap();
    let dir = tempfile::tempdir().unwrap();

    let args = DataArgs {
        input: write_input(&dir, DOGS),
        source: table_source(),
        fields: vec!["breed".into()],
        max_rows: 10,
        sample_size: 100,
        output: Some(dir.path().join("data.json")),
    };
    assert!(commands::data(&args).await.is_err());
}
