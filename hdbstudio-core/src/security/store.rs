//! Property storage for resolved connection values.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use zeroize::Zeroizing;

/// Property holding the normalized endpoint URL.
pub const URL_PROPERTY: &str = "url";

/// Property holding the normalized auth header value.
pub const AUTH_PROPERTY: &str = "auth";

/// Per-user key/value storage.
///
/// Values are wrapped in `Zeroizing` since the auth token passes through
/// here.
pub trait PropertyStore: Send + Sync {
    /// Returns the stored value for `key`.
    fn get(&self, key: &str) -> Option<Zeroizing<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Zeroizing<String>);

    /// Removes `key`, returning whether it was present.
    fn remove(&self, key: &str) -> bool;
}

/// In-memory [`PropertyStore`].
#[derive(Default)]
pub struct MemoryPropertyStore {
    properties: RwLock<HashMap<String, Zeroizing<String>>>,
}

impl MemoryPropertyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for MemoryPropertyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let properties = self
            .properties
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<&String> = properties.keys().collect();
        keys.sort();
        f.debug_struct("MemoryPropertyStore")
            .field("keys", &keys)
            .finish()
    }
}

impl PropertyStore for MemoryPropertyStore {
    fn get(&self, key: &str) -> Option<Zeroizing<String>> {
        self.properties
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Zeroizing<String>) {
        self.properties
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) -> bool {
        self.properties
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }
}
