//! Command handlers.

use crate::cli::{DataArgs, RequestArgs, SanitizeArgs, SchemaArgs};
use crate::output::write_output;
use crate::transport::FileTransport;
use hdbstudio_core::config::{ConnectionParams, ConnectorConfig};
use hdbstudio_core::security::{MemoryPropertyStore, resolve_auth, resolve_endpoint};
use hdbstudio_core::transport::HdbRequest;
use hdbstudio_core::error::HdbStudioError;
use hdbstudio_core::validation::{OutputKind, validate_no_secret};
use hdbstudio_core::{Connector, Result, query, redact_url};
use serde::Serialize;

/// Sanitizes the query and returns the text that would be sent.
pub fn sanitize(args: &SanitizeArgs) -> String {
    query::prepare(&args.sql, args.max_rows)
}

fn file_connector(
    input: &std::path::Path,
    sample_size: u32,
    max_rows: u32,
) -> Result<Connector<FileTransport>> {
    let config = ConnectorConfig::new()
        .with_sample_size(sample_size)
        .with_max_rows(max_rows)
        .with_cache_ttl_secs(0);
    Connector::new(FileTransport::new(input), config)
}

/// Infers and writes the schema of the input records.
///
/// # Errors
/// Returns configuration, I/O, transport or inference errors.
pub async fn schema(args: &SchemaArgs) -> Result<()> {
    let source = args.source.to_source()?;
    let connector = file_connector(
        &args.input,
        args.sample_size,
        hdbstudio_core::MAX_ROWS_LIMIT,
    )?;

    let inferred = connector.get_schema(&source).await?;
    write_output(&inferred, OutputKind::Schema, args.output.as_deref()).await
}

/// Infers the schema, then projects and writes the requested columns.
///
/// # Errors
/// Returns configuration, I/O, transport, inference or projection errors.
pub async fn data(args: &DataArgs) -> Result<()> {
    let source = args.source.to_source()?;
    let connector = file_connector(&args.input, args.sample_size, args.max_rows)?;

    let inferred = connector.get_schema(&source).await?;
    let table = connector.get_data(&source, &inferred, &args.fields).await?;
    write_output(&table, OutputKind::Data, args.output.as_deref()).await
}

/// A request as it would go over the wire, minus the secret.
#[derive(Debug, Serialize)]
pub struct RequestPreview {
    /// Endpoint with any password masked
    pub endpoint: String,
    /// Authorization header with the token masked
    pub authorization: String,
    /// Whether invalid certificates would be accepted
    pub allow_bad_certs: bool,
    /// JSON body
    pub body: HdbRequest,
}

/// Resolves endpoint and auth and builds the request without sending it.
///
/// # Errors
/// Returns configuration errors for a bad URL, key or target, or when the
/// key would appear in the rendered preview.
pub fn request(args: &RequestArgs) -> Result<RequestPreview> {
    let mut params = ConnectionParams::default()
        .with_secure(args.secure)
        .with_allow_bad_certs(args.allow_bad_certs);
    params.url = args.url.clone();
    if let Some(key) = &args.key {
        params = params.with_key(key.as_str());
    }

    let store = MemoryPropertyStore::new();
    let endpoint = resolve_endpoint(&store, &params)?;
    let token = resolve_auth(&store, &params)?;

    let body = args.target.to_request(args.max_rows)?;

    let preview = RequestPreview {
        endpoint: redact_url(&endpoint),
        authorization: masked_header(token.header_value()),
        allow_bad_certs: params.allow_bad_certs,
        body,
    };

    let rendered = serde_json::to_value(&preview)
        .map_err(|e| HdbStudioError::serialization("Failed to serialize request", e))?;
    validate_no_secret(&rendered, token.credential()).map_err(|e| {
        HdbStudioError::configuration(format!("Request preview rejected: {}", e))
    })?;
    Ok(preview)
}

fn masked_header(header: &str) -> String {
    match header.split_once(' ') {
        Some((scheme, _)) => format!("{} ****", scheme),
        None => "****".to_string(),
    }
}
