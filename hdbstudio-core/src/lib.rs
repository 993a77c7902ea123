//! Core library for the HarperDB reporting connector.
//!
//! The connector turns a user query against a schemaless HarperDB table into
//! a flat, typed table a reporting tool can chart:
//!
//! 1. [`query`] strips comments and trailing statements and caps the row count
//! 2. [`transport`] sends the statement and decodes the record list
//! 3. [`inference`] derives a column schema from a bounded sample
//! 4. [`projection`] turns the full record set into rows for requested columns
//!
//! [`pointer`] implements the JSON Pointer addressing used for field paths.
//! [`connector::Connector`] runs the whole pipeline over any [`Transport`].
//!
//! # Security Guarantees
//! - Auth tokens live in `Zeroizing` containers and never appear in `Debug`
//! - Endpoint URLs are redacted before they reach logs or errors
//! - Output structure is checked for leaked Basic auth headers before it is written

pub mod cache;
pub mod config;
pub mod connector;
pub mod error;
pub mod inference;
pub mod logging;
pub mod models;
pub mod pointer;
pub mod projection;
pub mod query;
pub mod security;
pub mod transport;
pub mod validation;

// Re-export commonly used types
pub use cache::ResultCache;
pub use config::{ConnectionParams, ConnectorConfig};
pub use connector::Connector;
pub use error::{HdbStudioError, Result, redact_url};
pub use inference::{SchemaInferrer, infer_schema};
pub use logging::init_logging;
pub use models::{
    ColumnSchema, DataRow, DataTable, FieldDescriptor, FieldIndex, InferredSchema,
    RECORD_COUNT_FIELD, Record, TypeTag,
};
pub use pointer::{PathSegment, build, build_from_values, resolve, resolve_with_indices};
pub use projection::{MAX_ROWS_LIMIT, project};
pub use query::{QuerySource, cap_limit, prepare, strip_comments};
pub use security::{
    AuthToken, MemoryPropertyStore, PropertyStore, resolve_auth, resolve_endpoint,
};
pub use transport::{HdbRequest, Transport, decode_response};

pub use validation::{
    OutputKind, ValidationError, initialize_schema_validator, validate_data_output,
    validate_no_secret, validate_schema_output,
};
