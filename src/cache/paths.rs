//! Cache path utilities - uses ~/.cache/repohealth/ by default

use std::path::{Path, PathBuf};

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "REPOHEALTH_CACHE_DIR";

/// Base cache directory.
/// Uses ~/.cache/repohealth/ on Unix, %LOCALAPPDATA%/repohealth/ on Windows.
pub fn get_cache_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }

    let base = if cfg!(windows) {
        std::env::var("LOCALAPPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".")))
    } else {
        dirs::cache_dir().unwrap_or_else(|| {
            // Fallback to ~/.cache
            dirs::home_dir()
                .map(|h| h.join(".cache"))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    };

    base.join("repohealth")
}

/// Directory holding persisted score entries
pub fn get_scores_dir(base: Option<&Path>) -> PathBuf {
    base.map(Path::to_path_buf).unwrap_or_else(get_cache_dir).join("scores")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_dir_under_base() {
        let base = Path::new("/tmp/rh");
        assert_eq!(get_scores_dir(Some(base)), PathBuf::from("/tmp/rh/scores"));
    }

    #[test]
    fn test_default_scores_dir_format() {
        let dir = get_scores_dir(None);
        assert!(dir.ends_with("scores"));
    }
}
