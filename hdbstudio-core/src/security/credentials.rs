//! Basic auth token with automatic memory zeroing.

use crate::error::HdbStudioError;
use zeroize::Zeroizing;

/// Scheme prefix HarperDB expects in the `Authorization` header.
pub const AUTH_SCHEME_PREFIX: &str = "Basic ";

/// `Authorization` header value for a HarperDB endpoint.
///
/// # Example
///
/// ```rust
/// use hdbstudio_core::security::AuthToken;
///
/// let token = AuthToken::from_key("  c2VjcmV0 ")?;
/// assert_eq!(token.header_value(), "Basic c2VjcmV0");
/// assert!(!format!("{:?}", token).contains("c2VjcmV0"));
/// # Ok::<(), hdbstudio_core::HdbStudioError>(())
/// ```
#[derive(Clone)]
pub struct AuthToken {
    value: Zeroizing<String>,
}

impl AuthToken {
    /// Normalizes a user-entered key into a header value.
    ///
    /// Surrounding whitespace is trimmed and the `Basic ` prefix is added when
    /// missing.
    ///
    /// # Errors
    /// Returns a configuration error for a blank key.
    pub fn from_key(key: &str) -> crate::Result<Self> {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(HdbStudioError::configuration(
                "Auth key not defined, cannot access HarperDB",
            ));
        }

        let value = if trimmed.starts_with(AUTH_SCHEME_PREFIX) {
            Zeroizing::new(trimmed.to_string())
        } else {
            Zeroizing::new(format!("{}{}", AUTH_SCHEME_PREFIX, trimmed))
        };
        Ok(Self { value })
    }

    /// Wraps an already-normalized header value.
    pub(crate) fn from_stored(value: Zeroizing<String>) -> Self {
        Self { value }
    }

    /// The full header value, prefix included.
    pub fn header_value(&self) -> &str {
        &self.value
    }

    /// The credential alone, without the scheme prefix.
    pub fn credential(&self) -> &str {
        let header = self.header_value();
        header.strip_prefix(AUTH_SCHEME_PREFIX).unwrap_or(header)
    }

    pub(crate) fn to_stored(&self) -> Zeroizing<String> {
        self.value.clone()
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}
