//! Sampling and row-cap configuration for the connector.

use crate::error::HdbStudioError;
use crate::projection::MAX_ROWS_LIMIT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Records sampled for schema inference unless configured otherwise.
pub const DEFAULT_SAMPLE_SIZE: u32 = 100;

/// Largest sample the connector will request.
pub const MAX_SAMPLE_SIZE: u32 = 100;

/// Seconds a fetched result stays cached by default.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration for a [`Connector`](crate::connector::Connector).
///
/// # Example
/// ```rust
/// use hdbstudio_core::config::ConnectorConfig;
///
/// let config = ConnectorConfig::new()
///     .with_sample_size(25)
///     .with_max_rows(5_000)
///     .with_cache_ttl_secs(0);
///
/// assert!(config.validate().is_ok());
/// assert!(config.cache_ttl().is_zero());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Records fetched for schema inference
    pub sample_size: u32,
    /// Upper bound on rows fetched and projected for data requests
    pub max_rows: u32,
    /// Lifetime of cached results in seconds, zero disables caching
    pub cache_ttl_secs: u64,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            max_rows: MAX_ROWS_LIMIT,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl ConnectorConfig {
    /// Creates a new connector config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the inference sample size.
    pub fn with_sample_size(mut self, size: u32) -> Self {
        self.sample_size = size;
        self
    }

    /// Builder method to set the data row cap.
    pub fn with_max_rows(mut self, rows: u32) -> Self {
        self.max_rows = rows;
        self
    }

    /// Builder method to set the cache lifetime.
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Cache lifetime as a duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Validates configuration values.
    ///
    /// # Errors
    /// Returns a configuration error when a size is zero or above its limit.
    pub fn validate(&self) -> crate::Result<()> {
        if self.sample_size == 0 {
            return Err(HdbStudioError::configuration(
                "sample_size must be greater than 0",
            ));
        }

        if self.sample_size > MAX_SAMPLE_SIZE {
            return Err(HdbStudioError::configuration(format!(
                "sample_size must not exceed {}",
                MAX_SAMPLE_SIZE
            )));
        }

        if self.max_rows == 0 {
            return Err(HdbStudioError::configuration(
                "max_rows must be greater than 0",
            ));
        }

        if self.max_rows > MAX_ROWS_LIMIT {
            return Err(HdbStudioError::configuration(format!(
                "max_rows must not exceed {}",
                MAX_ROWS_LIMIT
            )));
        }

        Ok(())
    }
}
