//! Endpoint and credential handling.
//!
//! - `credentials`: the Basic auth token, zeroed on drop and never printed
//! - `store`: per-user property storage for resolved endpoint and token
//! - `endpoint`: normalization of user-entered URLs and keys
//!
//! Resolved values are cached in the [`PropertyStore`] on first use; later
//! calls return the stored value without looking at the parameters again.

mod credentials;
mod endpoint;
mod store;

pub use credentials::{AUTH_SCHEME_PREFIX, AuthToken};
pub use endpoint::{resolve_auth, resolve_endpoint};
pub use store::{AUTH_PROPERTY, MemoryPropertyStore, PropertyStore, URL_PROPERTY};
