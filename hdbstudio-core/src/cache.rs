//! Time-limited cache of fetched record sets.
//!
//! Keyed by the prepared query text. Entries older than the configured TTL
//! are evicted on lookup and swept on every insert; a zero TTL disables
//! caching entirely.

use crate::models::Record;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct CacheEntry {
    stored_at: Instant,
    records: Arc<Vec<Record>>,
}

/// Thread-safe result cache.
#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    /// Creates a cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true when caching is enabled.
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Looks up a fresh entry for `query`, evicting it if expired.
    pub fn get(&self, query: &str) -> Option<Arc<Vec<Record>>> {
        self.get_at(query, Instant::now())
    }

    /// Stores `records` for `query`. Does nothing when caching is disabled.
    pub fn insert(&self, query: impl Into<String>, records: Arc<Vec<Record>>) {
        self.insert_at(query.into(), records, Instant::now());
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn get_at(&self, query: &str, now: Instant) -> Option<Arc<Vec<Record>>> {
        if !self.is_enabled() {
            return None;
        }

        let mut entries = self.lock();
        let fresh = entries
            .get(query)
            .map(|entry| now.saturating_duration_since(entry.stored_at) < self.ttl)?;

        if fresh {
            entries.get(query).map(|entry| Arc::clone(&entry.records))
        } else {
            tracing::trace!("Evicting expired cache entry");
            entries.remove(query);
            None
        }
    }

    fn insert_at(&self, query: String, records: Arc<Vec<Record>>, now: Instant) {
        if !self.is_enabled() {
            return;
        }
        let mut entries = self.lock();
        entries.retain(|_, entry| now.saturating_duration_since(entry.stored_at) < self.ttl);
        entries.insert(
            query,
            CacheEntry {
                stored_at: now,
                records,
            },
        );
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // entries are replaced whole, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Arc<Vec<Record>> {
        let record = json!({"a": 1}).as_object().cloned().unwrap();
        Arc::new(vec![record])
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.insert("SELECT 1", sample());

        let hit = cache.get("SELECT 1").unwrap();
        assert_eq!(hit.len(), 1);
        assert!(cache.get("SELECT 2").is_none());
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let cache = ResultCache::new(Duration::from_secs(60));
        let start = Instant::now();
        cache.insert_at("q".to_string(), sample(), start);

        assert!(cache.get_at("q", start + Duration::from_secs(59)).is_some());
        assert!(cache.get_at("q", start + Duration::from_secs(60)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_sweeps_expired_entries() {
        let cache = ResultCache::new(Duration::from_secs(60));
        let start = Instant::now();
        cache.insert_at("old".to_string(), sample(), start);
        cache.insert_at("recent".to_string(), sample(), start + Duration::from_secs(30));
        assert_eq!(cache.len(), 2);

        let later = start + Duration::from_secs(75);
        cache.insert_at("new".to_string(), sample(), later);

        assert_eq!(cache.len(), 2);
        assert!(cache.get_at("old", later).is_none());
        assert!(cache.get_at("recent", later).is_some());
        assert!(cache.get_at("new", later).is_some());
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let cache = ResultCache::new(Duration::ZERO);
        cache.insert("q", sample());

        assert!(!cache.is_enabled());
        assert!(cache.is_empty());
        assert!(cache.get("q").is_none());
    }

    #[test]
    fn test_clear() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.insert("a", sample());
        cache.insert("b", sample());
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
