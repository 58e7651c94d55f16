//! Score caching
//!
//! Two layers keyed by lowercased `owner/repo`:
//!
//! - `memory` - transient, one hour TTL
//! - `disk` - persistent JSON files under the user cache dir, 24 hour TTL
//!
//! Lookups go memory first, then disk; a disk hit is promoted into memory.
//! Every failure (I/O, corrupt JSON, unwritable dir) is logged and treated
//! as a miss so callers never see a cache error.

mod disk;
mod memory;
pub mod paths;
pub mod traits;

pub use disk::{DiskCache, DISK_TTL_HOURS};
pub use memory::{MemoryCache, MEMORY_TTL_MINUTES};
pub use paths::{get_cache_dir, get_scores_dir, CACHE_DIR_ENV};
pub use traits::{cache_key, CacheEntry, CacheLayer};

use crate::config::CacheConfig;
use crate::models::ScoreResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// Entry counts per layer
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub memory_entries: usize,
    pub disk_entries: usize,
    pub disk_dir: Option<PathBuf>,
}

/// Two-level score cache
pub struct ScoreCache {
    enabled: bool,
    memory: MemoryCache,
    disk: Option<DiskCache>,
}

impl ScoreCache {
    pub fn new(memory: MemoryCache, disk: Option<DiskCache>) -> Self {
        Self {
            enabled: true,
            memory,
            disk,
        }
    }

    /// Memory-only cache
    pub fn in_memory() -> Self {
        Self::new(MemoryCache::new(), None)
    }

    /// A cache that never hits and never stores
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            memory: MemoryCache::new(),
            disk: None,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        let disk = config
            .persistent
            .then(|| DiskCache::new(get_scores_dir(config.dir.as_deref())));
        Self::new(MemoryCache::new(), disk)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn layers(&self) -> Vec<&dyn CacheLayer> {
        let mut layers: Vec<&dyn CacheLayer> = vec![&self.memory];
        if let Some(disk) = &self.disk {
            layers.push(disk);
        }
        layers
    }

    /// Fresh entry as of `now`, checking memory then disk
    pub fn lookup_at(&self, owner: &str, repo: &str, now: DateTime<Utc>) -> Option<CacheEntry> {
        if !self.enabled {
            return None;
        }

        if let Some(entry) = self.memory.get_at(owner, repo, now) {
            debug!("Cache hit ({}): {}", self.memory.name(), entry.key);
            return Some(entry);
        }

        let disk = self.disk.as_ref()?;
        let entry = disk.get_at(owner, repo, now)?;
        debug!("Cache hit ({}): {}", disk.name(), entry.key);
        // Only entries still inside the memory TTL move up
        if !entry.is_expired(self.memory.ttl(), now) {
            self.memory.store(&entry);
        }
        Some(entry)
    }

    /// Cached score for a repository, if fresh
    pub fn get_cached_score(&self, owner: &str, repo: &str) -> Option<ScoreResult> {
        self.lookup_at(owner, repo, Utc::now()).map(|e| e.payload)
    }

    /// Store a score in every layer; `false` if any layer failed
    pub fn cache_score(&self, owner: &str, repo: &str, result: &ScoreResult) -> bool {
        if !self.enabled {
            return false;
        }
        let entry = CacheEntry::new(owner, repo, result.clone(), Utc::now());
        self.layers()
            .into_iter()
            .map(|layer| layer.store(&entry))
            .fold(true, |ok, stored| ok && stored)
    }

    /// Forget one repository in every layer
    pub fn invalidate(&self, owner: &str, repo: &str) -> bool {
        let key = cache_key(owner, repo);
        self.layers()
            .into_iter()
            .map(|layer| layer.remove(&key))
            .fold(false, |any, removed| any || removed)
    }

    /// Remove everything; returns the number of entries removed
    pub fn clear(&self) -> usize {
        self.layers().into_iter().map(|layer| layer.clear()).sum()
    }

    /// Persisted entries, stale ones included
    pub fn persisted_entries(&self) -> Vec<CacheEntry> {
        self.disk.as_ref().map(DiskCache::entries).unwrap_or_default()
    }

    pub fn disk_ttl(&self) -> Option<chrono::Duration> {
        self.disk.as_ref().map(|d| d.ttl())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            enabled: self.enabled,
            memory_entries: self.memory.len(),
            disk_entries: self.disk.as_ref().map(|d| d.len()).unwrap_or(0),
            disk_dir: self.disk.as_ref().map(|d| d.dir().to_path_buf()),
        }
    }
}
