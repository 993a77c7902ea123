//! Request and response plumbing for the HarperDB operations API.
//!
//! The connector talks to the database through the [`Transport`] trait so the
//! HTTP client stays outside this crate. Implementations send the serialized
//! [`HdbRequest`] as a JSON POST body and hand the raw status and body to
//! [`decode_response`].

use crate::error::HdbStudioError;
use crate::models::Record;
use crate::pointer::json_kind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status code HarperDB returns for a successful operation.
pub const STATUS_OK: u16 = 200;

/// An operation request body.
///
/// The connector itself only sends [`HdbRequest::Sql`]; the describe
/// operations answer with metadata objects rather than record arrays.
///
/// # Example
/// ```rust
/// use hdbstudio_core::transport::HdbRequest;
///
/// let body = serde_json::to_string(&HdbRequest::sql("SELECT 1 LIMIT 100"))?;
/// assert_eq!(body, r#"{"operation":"sql","sql":"SELECT 1 LIMIT 100"}"#);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum HdbRequest {
    /// Run an SQL statement
    Sql { sql: String },
    /// List the tables of a schema
    DescribeSchema { schema: String },
    /// Describe the attributes of one table
    DescribeTable { schema: String, table: String },
}

impl HdbRequest {
    /// Creates an SQL operation.
    pub fn sql(sql: impl Into<String>) -> Self {
        Self::Sql { sql: sql.into() }
    }

    /// Creates a `describe_schema` operation.
    pub fn describe_schema(schema: impl Into<String>) -> Self {
        Self::DescribeSchema {
            schema: schema.into(),
        }
    }

    /// Creates a `describe_table` operation.
    pub fn describe_table(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self::DescribeTable {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Value of the `operation` field on the wire.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Sql { .. } => "sql",
            Self::DescribeSchema { .. } => "describe_schema",
            Self::DescribeTable { .. } => "describe_table",
        }
    }

    /// Statement text, for SQL operations.
    pub fn sql_text(&self) -> Option<&str> {
        match self {
            Self::Sql { sql } => Some(sql),
            Self::DescribeSchema { .. } | Self::DescribeTable { .. } => None,
        }
    }
}

/// Executes operation requests against a HarperDB endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the decoded records.
    ///
    /// # Errors
    /// Returns [`HdbStudioError::Transport`] when the endpoint reports a
    /// failure, or a serialization error for unreadable bodies.
    async fn execute(&self, request: &HdbRequest) -> crate::Result<Vec<Record>>;
}

/// Decodes a raw HTTP status and body into records.
///
/// A non-200 status, or a 200 body shaped as `{"error": ...}`, becomes a
/// transport error carrying the envelope text. Bodies that are not JSON fall
/// back to the raw text for non-200 statuses.
///
/// # Errors
/// Returns a transport error for failures reported by the endpoint and a
/// serialization error when a successful body is not JSON.
pub fn decode_response(status: u16, body: &str) -> crate::Result<Vec<Record>> {
    if status != STATUS_OK {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| error_text(&value))
            .unwrap_or_else(|| body.to_string());
        tracing::warn!("HarperDB request failed with status {}", status);
        return Err(HdbStudioError::transport(status, message));
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| HdbStudioError::serialization("Failed to parse HarperDB response", e))?;

    if let Some(message) = error_text(&value) {
        tracing::warn!("HarperDB returned an error envelope with status {}", status);
        return Err(HdbStudioError::transport(status, message));
    }

    parse_records(value, status)
}

/// Extracts the `error` text of a failure envelope.
fn error_text(value: &Value) -> Option<String> {
    match value.as_object()?.get("error")? {
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn parse_records(value: Value, status: u16) -> crate::Result<Vec<Record>> {
    let Value::Array(items) = value else {
        return Err(HdbStudioError::transport(
            status,
            "expected a JSON array of records",
        ));
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(position, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(HdbStudioError::transport(
                status,
                format!(
                    "record {} is not an object: {}",
                    position,
                    json_kind(&other)
                ),
            )),
        })
        .collect::<crate::Result<Vec<_>>>()?;

    tracing::debug!("Decoded {} records", records.len());
    Ok(records)
}
