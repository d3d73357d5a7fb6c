//! Key-value cache consulted by resource lookups.
//!
//! The client only needs get/set/delete by key. Eviction and expiry are
//! up to the implementation; [`InMemoryCache`] keeps everything until it
//! is deleted.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

/// Storage for decoded resources, keyed by an opaque string.
///
/// Resource services key entries by request path, e.g. `/users/42`.
pub trait CacheGateway: Send + Sync {
    /// Look up a cached value.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store a value, replacing any previous one.
    fn set(&self, key: &str, value: Value);

    /// Remove a value. Returns `true` if something was removed.
    fn delete(&self, key: &str) -> bool;
}

/// A process-local cache backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl InMemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheGateway for InMemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
    }

    fn delete(&self, key: &str) -> bool {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get_delete() {
        let cache = InMemoryCache::new();
        assert!(cache.is_empty());

        cache.set("/users/1", json!({"id": 1}));
        assert_eq!(cache.get("/users/1"), Some(json!({"id": 1})));
        assert_eq!(cache.len(), 1);

        assert!(cache.delete("/users/1"));
        assert!(!cache.delete("/users/1"));
        assert_eq!(cache.get("/users/1"), None);
    }

    #[test]
    fn test_set_replaces() {
        let cache = InMemoryCache::new();
        cache.set("k", json!(1));
        cache.set("k", json!(2));
        assert_eq!(cache.get("k"), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }
}
