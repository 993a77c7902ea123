//! Endpoint URL and auth resolution.

use super::credentials::AuthToken;
use super::store::{AUTH_PROPERTY, PropertyStore, URL_PROPERTY};
use crate::config::ConnectionParams;
use crate::error::{HdbStudioError, redact_url};
use regex::Regex;
use std::sync::OnceLock;
use zeroize::Zeroizing;

fn scheme_pattern() -> &'static Regex {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*)://").expect("Invalid URL scheme pattern")
    })
}

/// Returns the endpoint URL, normalizing and storing it on first use.
///
/// Normalization trims whitespace, rejects schemes other than `http` and
/// `https`, upgrades `http` to `https` when `params.secure` is set and adds a
/// scheme when none is given.
///
/// # Errors
/// Returns a configuration error for a missing, blank or malformed URL or an
/// unsupported scheme.
///
/// # Example
/// ```rust
/// use hdbstudio_core::config::ConnectionParams;
/// use hdbstudio_core::security::{MemoryPropertyStore, resolve_endpoint};
///
/// let store = MemoryPropertyStore::new();
/// let params = ConnectionParams::new(" db.example.com:9925 ").with_secure(true);
/// assert_eq!(resolve_endpoint(&store, &params)?, "https://db.example.com:9925");
/// # Ok::<(), hdbstudio_core::HdbStudioError>(())
/// ```
pub fn resolve_endpoint(
    store: &dyn PropertyStore,
    params: &ConnectionParams,
) -> crate::Result<String> {
    if let Some(stored) = store.get(URL_PROPERTY) {
        return Ok(stored.as_str().to_owned());
    }

    let raw = params.url.as_deref().map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(HdbStudioError::configuration(
            "URL not defined, cannot access HarperDB",
        ));
    }

    let endpoint = normalize_endpoint(raw, params.secure)?;
    let parsed = url::Url::parse(&endpoint).map_err(|e| {
        HdbStudioError::configuration(format!(
            "Invalid HarperDB URL '{}': {}",
            redact_url(&endpoint),
            e
        ))
    })?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(HdbStudioError::configuration(format!(
            "HarperDB URL '{}' has no host",
            redact_url(&endpoint)
        )));
    }

    tracing::info!("Resolved HarperDB endpoint {}", redact_url(&endpoint));
    store.set(URL_PROPERTY, Zeroizing::new(endpoint.clone()));
    Ok(endpoint)
}

fn normalize_endpoint(raw: &str, secure: bool) -> crate::Result<String> {
    let Some(captures) = scheme_pattern().captures(raw) else {
        let scheme = if secure { "https" } else { "http" };
        return Ok(format!("{}://{}", scheme, raw));
    };

    let scheme = captures
        .get(1)
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_default();
    let rest = captures
        .get(0)
        .map_or(raw, |whole| &raw[whole.end()..]);

    match scheme.as_str() {
        "https" => Ok(format!("https://{}", rest)),
        "http" if secure => Ok(format!("https://{}", rest)),
        "http" => Ok(format!("http://{}", rest)),
        other => Err(HdbStudioError::configuration(format!(
            "URL uses bad protocol \"{}\", you must use either http or https",
            other
        ))),
    }
}

/// Returns the auth token, normalizing and storing it on first use.
///
/// # Errors
/// Returns a configuration error when no usable key is available.
pub fn resolve_auth(
    store: &dyn PropertyStore,
    params: &ConnectionParams,
) -> crate::Result<AuthToken> {
    if let Some(stored) = store.get(AUTH_PROPERTY) {
        return Ok(AuthToken::from_stored(stored));
    }

    let key = params.key.as_ref().map(|key| key.as_str()).unwrap_or_default();
    let token = AuthToken::from_key(key)?;

    tracing::debug!("Storing normalized auth token");
    store.set(AUTH_PROPERTY, token.to_stored());
    Ok(token)
}
