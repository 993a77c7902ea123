//! End-to-end schema and data requests.
//!
//! A [`Connector`] ties the pipeline together: render the query source,
//! sanitize and cap it, fetch through the [`Transport`] (or the result cache)
//! and then infer or project.

use crate::cache::ResultCache;
use crate::config::ConnectorConfig;
use crate::inference::infer_schema;
use crate::models::{DataTable, InferredSchema, Record};
use crate::query::{self, QuerySource};
use crate::transport::{HdbRequest, Transport};
use std::sync::Arc;

/// Reporting connector over a HarperDB transport.
#[derive(Debug)]
pub struct Connector<T> {
    transport: T,
    config: ConnectorConfig,
    cache: ResultCache,
}

impl<T: Transport> Connector<T> {
    /// Creates a connector after validating `config`.
    ///
    /// # Errors
    /// Returns a configuration error when `config` fails validation.
    pub fn new(transport: T, config: ConnectorConfig) -> crate::Result<Self> {
        config.validate()?;
        let cache = ResultCache::new(config.cache_ttl());
        Ok(Self {
            transport,
            config,
            cache,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Drops all cached results.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Samples `source` and infers its schema.
    ///
    /// At most `sample_size` records are requested and analyzed.
    ///
    /// # Errors
    /// Returns configuration errors for an unusable source, transport errors
    /// from the endpoint and unsupported shape errors from inference.
    pub async fn get_schema(&self, source: &QuerySource) -> crate::Result<InferredSchema> {
        let text = source.to_query_text()?;
        let prepared = query::prepare(&text, self.config.sample_size);
        let records = self.fetch(prepared).await?;

        // transports that ignore the LIMIT clause still get a bounded sample
        let sample_len = usize::try_from(self.config.sample_size)
            .map_or(records.len(), |size| size.min(records.len()));
        let inferred = infer_schema(&records[..sample_len])?;
        tracing::info!(
            "Inferred {} columns from {} sampled records",
            inferred.schema.len(),
            sample_len
        );
        Ok(inferred)
    }

    /// Fetches `source` and projects it onto `requested` columns.
    ///
    /// # Errors
    /// Returns configuration and transport errors as for
    /// [`get_schema`](Self::get_schema), and a contract violation for a
    /// requested name missing from `schema`.
    pub async fn get_data<S: AsRef<str>>(
        &self,
        source: &QuerySource,
        schema: &InferredSchema,
        requested: &[S],
    ) -> crate::Result<DataTable> {
        let text = source.to_query_text()?;
        let prepared = query::prepare(&text, self.config.max_rows);
        let records = self.fetch(prepared).await?;

        let table = schema.project(&records, requested, self.config.max_rows)?;
        tracing::info!(
            "Projected {} rows onto {} columns",
            table.row_count(),
            table.schema.len()
        );
        Ok(table)
    }

    async fn fetch(&self, prepared: String) -> crate::Result<Arc<Vec<Record>>> {
        if let Some(records) = self.cache.get(&prepared) {
            tracing::debug!("Serving {} records from cache", records.len());
            return Ok(records);
        }

        let request = HdbRequest::sql(prepared.clone());
        let records = Arc::new(self.transport.execute(&request).await?);
        tracing::debug!("Fetched {} records", records.len());

        self.cache.insert(prepared, Arc::clone(&records));
        Ok(records)
    }
}
