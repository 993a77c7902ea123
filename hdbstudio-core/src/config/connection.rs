//! User-supplied connection parameters.

use zeroize::Zeroizing;

/// Endpoint and auth input as entered by the user.
///
/// The key is held in a `Zeroizing` container and never appears in `Debug`
/// output. Normalization happens in
/// [`resolve_endpoint`](crate::security::resolve_endpoint) and
/// [`resolve_auth`](crate::security::resolve_auth).
#[derive(Clone, Default)]
pub struct ConnectionParams {
    /// Endpoint, with or without scheme (`db.example.com:9925`)
    pub url: Option<String>,
    /// Basic auth token, with or without the `Basic ` prefix
    pub key: Option<Zeroizing<String>>,
    /// Force `https` when the scheme is missing or `http`
    pub secure: bool,
    /// Accept invalid TLS certificates
    pub allow_bad_certs: bool,
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("url", &self.url.as_deref().map(crate::error::redact_url))
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("secure", &self.secure)
            .field("allow_bad_certs", &self.allow_bad_certs)
            .finish()
    }
}

impl ConnectionParams {
    /// Creates parameters for `url` with no key.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Builder method to set the auth key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(Zeroizing::new(key.into()));
        self
    }

    /// Builder method to require `https`.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Builder method to accept invalid certificates.
    pub fn with_allow_bad_certs(mut self, allow: bool) -> Self {
        self.allow_bad_certs = allow;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_params_builder() {
        let params = ConnectionParams::new("localhost:9925")
            .with_key("c2VjcmV0")
            .with_secure(true);

        assert_eq!(params.url.as_deref(), Some("localhost:9925"));
        assert!(params.key.is_some());
        assert!(params.secure);
        assert!(!params.allow_bad_certs);
    }

    #[test]
    fn test_debug_never_shows_key() {
        let params = ConnectionParams::new("https://db.example.com").with_key("Basic c2VjcmV0");
        let debug = format!("{:?}", params);
        assert!(!debug.contains("c2VjcmV0"));
        assert!(debug.contains("<redacted>"));
    }
}
