//! Persistent score cache: one JSON file per repository

use super::traits::{CacheEntry, CacheLayer};
use crate::models::ScoreResult;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Persistent entries are considered fresh for 24 hours
pub const DISK_TTL_HOURS: i64 = 24;

/// Cache format version - bump when schema changes
const CACHE_VERSION: u32 = 1;

/// On-disk layout: the score result plus bookkeeping fields
#[derive(Debug, Serialize, Deserialize)]
struct PersistedEntry {
    version: u32,
    key: String,
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    result: ScoreResult,
}

/// File-backed cache layer
pub struct DiskCache {
    dir: PathBuf,
    ttl: Duration,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_ttl(dir, Duration::hours(DISK_TTL_HOURS))
    }

    pub fn with_ttl(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the entry for `key` ("owner/repo")
    fn entry_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .replace('/', "__")
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }

    fn entry_files(&self) -> Vec<PathBuf> {
        let Ok(read_dir) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        read_dir
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect()
    }

    /// Every readable entry, stale ones included, oldest first
    pub fn entries(&self) -> Vec<CacheEntry> {
        let mut entries: Vec<CacheEntry> = self
            .entry_files()
            .iter()
            .filter_map(|path| {
                let content = fs::read_to_string(path).ok()?;
                let persisted: PersistedEntry = serde_json::from_str(&content).ok()?;
                (persisted.version == CACHE_VERSION).then(|| CacheEntry {
                    key: persisted.key,
                    payload: persisted.result,
                    created_at: persisted.created_at,
                })
            })
            .collect();
        entries.sort_by_key(|e| e.created_at);
        entries
    }

    fn write_entry(&self, entry: &CacheEntry) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let persisted = PersistedEntry {
            version: CACHE_VERSION,
            key: entry.key.clone(),
            created_at: entry.created_at,
            result: entry.payload.clone(),
        };
        let json = serde_json::to_string_pretty(&persisted)?;

        // Write then rename so readers never see a half-written file
        let path = self.entry_path(&entry.key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl CacheLayer for DiskCache {
    fn name(&self) -> &str {
        "disk"
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    fn load(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        let persisted: PersistedEntry = match serde_json::from_str(&content) {
            Ok(p) => p,
            Err(e) => {
                warn!("Ignoring corrupt cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        if persisted.version != CACHE_VERSION || persisted.key != key {
            debug!(
                "Ignoring cache entry {} (version {}, key {})",
                path.display(),
                persisted.version,
                persisted.key
            );
            return None;
        }

        Some(CacheEntry {
            key: persisted.key,
            payload: persisted.result,
            created_at: persisted.created_at,
        })
    }

    fn store(&self, entry: &CacheEntry) -> bool {
        match self.write_entry(entry) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to write cache entry {}: {}", entry.key, e);
                false
            }
        }
    }

    fn remove(&self, key: &str) -> bool {
        fs::remove_file(self.entry_path(key)).is_ok()
    }

    fn clear(&self) -> usize {
        self.entry_files()
            .into_iter()
            .filter(|p| match fs::remove_file(p) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to remove {}: {}", p.display(), e);
                    false
                }
            })
            .count()
    }

    fn len(&self) -> usize {
        self.entry_files().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::sample_result;

    #[test]
    fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let result = sample_result(6.4);

        assert!(DiskCache::new(dir.path()).put("Tokio-RS", "Tokio", &result));

        let reopened = DiskCache::new(dir.path());
        let entry = reopened.get("tokio-rs", "tokio").expect("entry on disk");
        assert_eq!(entry.payload, result);
        assert!(dir.path().join("tokio-rs__tokio.json").exists());
    }

    #[test]
    fn test_payload_mirrors_result_with_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        cache.put("o", "r", &sample_result(4.2));

        let raw = fs::read_to_string(dir.path().join("o__r.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["final_score"], 4.2);
        assert!(json["created_at"].is_string());
        assert_eq!(json["version"], CACHE_VERSION);
    }

    #[test]
    fn test_expires_after_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        cache.put("o", "r", &sample_result(5.0));

        let in_23h = Utc::now() + Duration::hours(23);
        assert!(cache.get_at("o", "r", in_23h).is_some());

        let in_25h = Utc::now() + Duration::hours(DISK_TTL_HOURS + 1);
        assert!(cache.get_at("o", "r", in_25h).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("o__r.json"), "{ not json").unwrap();
        let cache = DiskCache::new(dir.path());
        assert!(cache.get("o", "r").is_none());

        // The next write replaces the corrupt file
        assert!(cache.put("o", "r", &sample_result(2.0)));
        assert!(cache.get("o", "r").is_some());
    }

    #[test]
    fn test_unwritable_dir_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        // A regular file where the cache dir should be
        let cache = DiskCache::new(&blocker);
        assert!(!cache.put("o", "r", &sample_result(1.0)));
        assert!(cache.get("o", "r").is_none());
    }

    #[test]
    fn test_clear_counts_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        cache.put("a", "one", &sample_result(1.0));
        cache.put("a", "two", &sample_result(2.0));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entries_skip_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        cache.put("a", "one", &sample_result(1.0));
        cache.put("a", "two", &sample_result(2.0));
        fs::write(dir.path().join("broken.json"), "{").unwrap();

        let keys: Vec<String> = cache.entries().into_iter().map(|e| e.key).collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&"a/one".to_string()));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let cache = DiskCache::new("/nonexistent/repohealth/cache");
        assert_eq!(cache.len(), 0);
        assert!(cache.get("o", "r").is_none());
    }
}
