//! Connector configuration.
//!
//! - `connector`: sampling, row caps and cache lifetime
//! - `connection`: user-supplied endpoint and auth parameters

mod connection;
mod connector;

pub use connection::ConnectionParams;
pub use connector::{
    ConnectorConfig, DEFAULT_CACHE_TTL_SECS, DEFAULT_SAMPLE_SIZE, MAX_SAMPLE_SIZE,
};
