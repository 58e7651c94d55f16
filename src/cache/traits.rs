//! Common interface for score cache layers
//!
//! Every layer stores whole [`CacheEntry`] records keyed by lowercased
//! `owner/repo`. Expiry is decided here, not by the layers, so memory and
//! disk agree on what "stale" means.

use crate::models::ScoreResult;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Normalized cache key for a repository
pub fn cache_key(owner: &str, repo: &str) -> String {
    format!(
        "{}/{}",
        owner.trim().to_lowercase(),
        repo.trim().to_lowercase()
    )
}

/// A cached score with its creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub payload: ScoreResult,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(owner: &str, repo: &str, payload: ScoreResult, created_at: DateTime<Utc>) -> Self {
        Self {
            key: cache_key(owner, repo),
            payload,
            created_at,
        }
    }

    /// Age of the entry at `now`
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }

    /// An entry is stale once its age exceeds the TTL
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) > ttl
    }
}

/// A single storage tier
///
/// Implementations swallow their own failures: a broken store behaves like
/// an empty one and `store` reports `false`.
pub trait CacheLayer: Send + Sync {
    /// Name of this cache layer (for logging)
    fn name(&self) -> &str;

    /// How long entries in this layer stay fresh
    fn ttl(&self) -> Duration;

    /// Raw lookup, ignoring expiry
    fn load(&self, key: &str) -> Option<CacheEntry>;

    /// Insert or replace the entry for `entry.key`
    fn store(&self, entry: &CacheEntry) -> bool;

    /// Remove one entry; returns whether something was removed
    fn remove(&self, key: &str) -> bool;

    /// Remove every entry; returns how many were removed
    fn clear(&self) -> usize;

    /// Number of stored entries, fresh or not
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fresh entry for a repository as of `now`.
    ///
    /// Stale entries are dropped on the way out.
    fn get_at(&self, owner: &str, repo: &str, now: DateTime<Utc>) -> Option<CacheEntry> {
        let key = cache_key(owner, repo);
        let entry = self.load(&key)?;
        if entry.is_expired(self.ttl(), now) {
            tracing::debug!(
                "Cache entry {} in {} layer expired ({} min old)",
                key,
                self.name(),
                entry.age(now).num_minutes()
            );
            self.remove(&key);
            return None;
        }
        Some(entry)
    }

    fn get(&self, owner: &str, repo: &str) -> Option<CacheEntry> {
        self.get_at(owner, repo, Utc::now())
    }

    /// Upsert a freshly computed score
    fn put(&self, owner: &str, repo: &str, payload: &ScoreResult) -> bool {
        self.store(&CacheEntry::new(owner, repo, payload.clone(), Utc::now()))
    }
}
