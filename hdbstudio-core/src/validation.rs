//! JSON Schema validation for connector output.
//!
//! Both documents the connector emits are checked before they are written:
//! the inferred schema (`fields`, `fieldIndex`, `schema`) and the projected
//! data table (`schema`, `rows`). On top of structural validation this
//! module checks that every row is as wide as the column list and that no
//! Basic auth token leaked into the connector-generated parts of the output.
//! [`validate_no_secret`] checks for one known token across the whole
//! document.
//!
//! # Example
//! ```rust
//! use hdbstudio_core::validation::{initialize_schema_validator, validate_data_output};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! initialize_schema_validator()?;
//! let table = json!({
//!     "schema": [{
//!         "name": "record_count",
//!         "label": "Record Count",
//!         "dataType": "NUMBER",
//!         "semantics": {"conceptType": "METRIC", "semanticType": "NUMBER"},
//!         "defaultAggregationType": "SUM"
//!     }],
//!     "rows": [{"values": [1]}]
//! });
//! validate_data_output(&table)?;
//! # Ok(())
//! # }
//! ```

use crate::models::{DataTable, InferredSchema};
use jsonschema::Validator;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

/// Validation errors with field-level reporting
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema compilation failed during initialization
    #[error("JSON Schema compilation failed: {message}")]
    SchemaCompilation { message: String },

    /// Validation failed with specific field errors
    #[error("Output validation failed with {error_count} errors: {errors:?}")]
    ValidationFailed {
        error_count: usize,
        errors: Vec<String>,
    },

    /// A row does not carry one value per column
    #[error("Row {row} has {actual} values but the table has {expected} columns")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Security validation failed - potential credential exposure
    #[error("Security validation failed: {reason}")]
    SecurityViolation { reason: String },

    /// JSON parsing error
    #[error("JSON parsing failed: {source}")]
    JsonParsing {
        #[from]
        source: serde_json::Error,
    },
}

/// Output documents that can be validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Inferred schema response
    Schema,
    /// Projected data response
    Data,
}

const COLUMN_DEFINITION: &str = r#"{
  "type": "object",
  "required": ["name", "label", "dataType", "semantics"],
  "properties": {
    "name": { "type": "string" },
    "label": { "type": "string" },
    "dataType": { "enum": ["NUMBER", "BOOLEAN", "STRING"] },
    "semantics": {
      "type": "object",
      "required": ["conceptType"],
      "properties": {
        "conceptType": { "enum": ["DIMENSION", "METRIC"] },
        "semanticType": { "enum": ["LATITUDE_LONGITUDE", "NUMBER"] }
      }
    },
    "defaultAggregationType": { "enum": ["SUM"] }
  }
}"#;

/// Embedded JSON Schema for the data response
const DATA_SCHEMA: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "HarperDB connector data response",
  "type": "object",
  "required": ["schema", "rows"],
  "properties": {
    "schema": { "type": "array", "items": { "$ref": "#/$defs/column" } },
    "rows": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["values"],
        "properties": {
          "values": {
            "type": "array",
            "items": { "type": ["string", "number", "boolean", "null"] }
          }
        }
      }
    }
  },
  "$defs": { "column": COLUMN }
}"##;

/// Embedded JSON Schema for the inferred schema response
const INFERRED_SCHEMA: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "HarperDB connector schema response",
  "type": "object",
  "required": ["fields", "fieldIndex", "schema"],
  "properties": {
    "fields": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["name", "type", "path"],
        "properties": {
          "name": { "type": "string" },
          "type": { "enum": ["null", "string", "number", "boolean", "geojson-point"] },
          "path": { "type": "string", "pattern": "^/" }
        }
      }
    },
    "fieldIndex": {
      "type": "object",
      "additionalProperties": { "type": "integer", "minimum": 0 }
    },
    "schema": {
      "type": "array",
      "minItems": 1,
      "items": { "$ref": "#/$defs/column" }
    }
  },
  "$defs": { "column": COLUMN }
}"##;

struct Validators {
    data: Validator,
    schema: Validator,
}

/// Compiled validators (initialized once)
static VALIDATORS: OnceLock<Validators> = OnceLock::new();

fn schema_text(kind: OutputKind) -> String {
    let template = match kind {
        OutputKind::Schema => INFERRED_SCHEMA,
        OutputKind::Data => DATA_SCHEMA,
    };
    template.replace("COLUMN", COLUMN_DEFINITION)
}

fn compile(kind: OutputKind) -> Result<Validator, ValidationError> {
    let definition = get_schema_definition(kind)?;
    jsonschema::validator_for(&definition).map_err(|e| ValidationError::SchemaCompilation {
        message: format!("Schema compilation error: {}", e),
    })
}

/// Compiles the embedded JSON Schemas and caches them for reuse.
///
/// Safe to call more than once.
///
/// # Errors
/// Returns `ValidationError::SchemaCompilation` if an embedded schema is invalid.
pub fn initialize_schema_validator() -> Result<(), ValidationError> {
    if VALIDATORS.get().is_some() {
        return Ok(());
    }

    let compiled = Validators {
        data: compile(OutputKind::Data)?,
        schema: compile(OutputKind::Schema)?,
    };

    // Another thread may have won the race; either copy is identical
    let _ = VALIDATORS.set(compiled);
    Ok(())
}

fn validator(kind: OutputKind) -> Result<&'static Validator, ValidationError> {
    let validators = VALIDATORS
        .get()
        .ok_or_else(|| ValidationError::SchemaCompilation {
            message: "Schema validator not initialized. Call initialize_schema_validator() first."
                .to_string(),
        })?;
    Ok(match kind {
        OutputKind::Schema => &validators.schema,
        OutputKind::Data => &validators.data,
    })
}

fn validate_structure(kind: OutputKind, json_value: &Value) -> Result<(), ValidationError> {
    let errors: Vec<String> = validator(kind)?
        .iter_errors(json_value)
        .map(|error| error.to_string())
        .collect();

    if !errors.is_empty() {
        return Err(ValidationError::ValidationFailed {
            error_count: errors.len(),
            errors,
        });
    }
    Ok(())
}

/// Validates a data response.
///
/// # Errors
/// Returns structural errors, a row width mismatch or a security violation.
pub fn validate_data_output(json_value: &Value) -> Result<(), ValidationError> {
    validate_structure(OutputKind::Data, json_value)?;
    validate_row_widths(json_value)?;
    validate_no_auth_tokens(json_value, "")?;
    Ok(())
}

/// Validates an inferred schema response.
///
/// # Errors
/// Returns structural errors or a security violation.
pub fn validate_schema_output(json_value: &Value) -> Result<(), ValidationError> {
    validate_structure(OutputKind::Schema, json_value)?;
    validate_no_auth_tokens(json_value, "")?;
    Ok(())
}

fn validate_row_widths(json_value: &Value) -> Result<(), ValidationError> {
    let expected = json_value
        .get("schema")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    let rows = json_value
        .get("rows")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for (row, item) in rows.iter().enumerate() {
        let actual = item
            .get("values")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        if actual != expected {
            return Err(ValidationError::RowWidthMismatch {
                row,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Keys whose contents come from the database rather than the connector.
///
/// Field names, column labels, pointer paths and cell values may hold any
/// text a HarperDB table holds, so they are not pattern-scanned.
const USER_DATA_KEYS: &[&str] = &["fieldIndex", "values", "name", "label", "path"];

fn auth_token_pattern() -> &'static Regex {
    static AUTH_TOKEN: OnceLock<Regex> = OnceLock::new();
    AUTH_TOKEN.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"\bBasic\s+[A-Za-z0-9+/]{12,}={0,2}").expect("Invalid auth token pattern")
    })
}

/// Recursively check connector-generated structure for Basic auth headers
fn validate_no_auth_tokens(value: &Value, path: &str) -> Result<(), ValidationError> {
    match value {
        Value::String(s) => {
            if auth_token_pattern().is_match(s) {
                return Err(ValidationError::SecurityViolation {
                    reason: format!("Potential Basic auth token found at path '{}'", path),
                });
            }
        }
        Value::Object(obj) => {
            for (key, val) in obj {
                if USER_DATA_KEYS.contains(&key.as_str()) {
                    continue;
                }
                if key.eq_ignore_ascii_case("authorization") {
                    return Err(ValidationError::SecurityViolation {
                        reason: format!("Authorization field found at path '{}'", path),
                    });
                }
                let new_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                validate_no_auth_tokens(val, &new_path)?;
            }
        }
        Value::Array(arr) => {
            for (index, item) in arr.iter().enumerate() {
                let new_path = format!("{}[{}]", path, index);
                validate_no_auth_tokens(item, &new_path)?;
            }
        }
        _ => {}
    }

    Ok(())
}

/// Checks that `secret` appears nowhere in `json_value`, user data included.
///
/// Unlike the pattern scan run by the `validate_*_output` functions, this
/// looks for one known credential, so it has no false positives on table
/// content. An empty secret never matches.
///
/// # Errors
/// Returns `ValidationError::SecurityViolation` naming the path of the leak.
pub fn validate_no_secret(json_value: &Value, secret: &str) -> Result<(), ValidationError> {
    if secret.is_empty() {
        return Ok(());
    }
    find_secret(json_value, secret, "")
}

fn find_secret(value: &Value, secret: &str, path: &str) -> Result<(), ValidationError> {
    let leaked = |at: &str| ValidationError::SecurityViolation {
        reason: format!("Auth token found at path '{}'", at),
    };

    match value {
        Value::String(s) if s.contains(secret) => Err(leaked(path)),
        Value::Object(obj) => {
            for (key, val) in obj {
                let new_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                if key.contains(secret) {
                    return Err(leaked(&new_path));
                }
                find_secret(val, secret, &new_path)?;
            }
            Ok(())
        }
        Value::Array(arr) => {
            for (index, item) in arr.iter().enumerate() {
                find_secret(item, secret, &format!("{}[{}]", path, index))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Parses and validates a data response.
///
/// # Errors
/// Returns validation errors for malformed JSON, structural violations or
/// security issues.
pub fn validate_and_parse_data(json_str: &str) -> Result<DataTable, ValidationError> {
    let json_value: Value = serde_json::from_str(json_str)?;
    validate_data_output(&json_value)?;
    Ok(serde_json::from_value(json_value)?)
}

/// Parses and validates an inferred schema response.
///
/// # Errors
/// See [`validate_and_parse_data`].
pub fn validate_and_parse_schema(json_str: &str) -> Result<InferredSchema, ValidationError> {
    let json_value: Value = serde_json::from_str(json_str)?;
    validate_schema_output(&json_value)?;
    Ok(serde_json::from_value(json_value)?)
}

/// Returns the embedded JSON Schema for `kind` as a parsed value.
///
/// # Errors
/// Returns `ValidationError::SchemaCompilation` if the embedded text is not JSON.
pub fn get_schema_definition(kind: OutputKind) -> Result<Value, ValidationError> {
    serde_json::from_str(&schema_text(kind)).map_err(|e| ValidationError::SchemaCompilation {
        message: format!("Failed to parse embedded schema: {}", e),
    })
}

#[cfg(test)]
mod tests;
