//! File-backed transport.
//!
//! Reads a saved operation response from disk instead of calling the
//! endpoint, so schemas and rows can be produced offline from a captured
//! HarperDB reply.

use async_trait::async_trait;
use hdbstudio_core::error::HdbStudioError;
use hdbstudio_core::transport::{HdbRequest, STATUS_OK, Transport, decode_response};
use hdbstudio_core::{Record, Result};
use std::path::{Path, PathBuf};

/// Serves every request from one JSON file.
#[derive(Debug, Clone)]
pub struct FileTransport {
    path: PathBuf,
}

impl FileTransport {
    /// Creates a transport reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file backing this transport.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Transport for FileTransport {
    async fn execute(&self, request: &HdbRequest) -> Result<Vec<Record>> {
        tracing::debug!(
            "Answering {} '{}' from {}",
            request.operation(),
            request.sql_text().unwrap_or_default(),
            self.path.display()
        );

        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| HdbStudioError::Io {
                context: format!("Failed to read {}", self.path.display()),
                source: e,
            })?;

        decode_response(STATUS_OK, &body)
    }
}
