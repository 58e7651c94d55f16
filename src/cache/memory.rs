//! In-process score cache

use super::traits::{CacheEntry, CacheLayer};
use chrono::Duration;
use dashmap::DashMap;
use std::sync::Arc;

/// Transient entries are considered fresh for one hour
pub const MEMORY_TTL_MINUTES: i64 = 60;

/// Thread-safe in-memory cache layer
#[derive(Clone)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(MEMORY_TTL_MINUTES))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheLayer for MemoryCache {
    fn name(&self) -> &str {
        "memory"
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    fn load(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    fn store(&self, entry: &CacheEntry) -> bool {
        self.entries.insert(entry.key.clone(), entry.clone());
        true
    }

    fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn clear(&self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
