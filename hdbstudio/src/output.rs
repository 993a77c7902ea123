//! Output writing for schema and data responses.
//!
//! Everything is validated against the embedded JSON Schemas before it is
//! written, so a malformed or credential-bearing document never reaches disk.

use hdbstudio_core::Result;
use hdbstudio_core::error::HdbStudioError;
use hdbstudio_core::validation::{OutputKind, validate_data_output, validate_schema_output};
use serde::Serialize;
use std::path::Path;

/// Validates `document` and renders it as pretty JSON.
///
/// # Errors
/// Returns a serialization error or a configuration error describing the
/// validation failure.
pub fn render<T: Serialize>(document: &T, kind: OutputKind) -> Result<String> {
    let value = serde_json::to_value(document)
        .map_err(|e| HdbStudioError::serialization("Failed to serialize output", e))?;

    let validated = match kind {
        OutputKind::Schema => validate_schema_output(&value),
        OutputKind::Data => validate_data_output(&value),
    };
    validated.map_err(|e| {
        HdbStudioError::configuration(format!("Output validation failed: {}", e))
    })?;
    tracing::debug!("Output validation passed");

    serde_json::to_string_pretty(&value)
        .map_err(|e| HdbStudioError::serialization("Failed to format output", e))
}

/// Validates `document` and writes it to `path`, or stdout when `None`.
///
/// # Errors
/// See [`render`]; also returns I/O errors from writing the file.
pub async fn write_output<T: Serialize>(
    document: &T,
    kind: OutputKind,
    path: Option<&Path>,
) -> Result<()> {
    let json_data = render(document, kind)?;

    match path {
        Some(path) => {
            tokio::fs::write(path, format!("{}\n", json_data))
                .await
                .map_err(|e| HdbStudioError::Io {
                    context: format!("Failed to write to {}", path.display()),
                    source: e,
                })?;
            tracing::info!("Wrote output to {}", path.display());
        }
        None => println!("{}", json_data),
    }
    Ok(())
}
