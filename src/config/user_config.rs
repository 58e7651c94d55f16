//! User-level configuration for repohealth
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/repohealth/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_API_URL: &str = "https://api.github.com/graphql";
pub const DEFAULT_REST_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Scopes a classic token may carry; anything else is rejected
pub const DEFAULT_ALLOWED_SCOPES: &[&str] = &[
    "public_repo",
    "read:org",
    "read:user",
    "user:email",
    "repo:status",
];

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const API_URL_ENV: &str = "REPOHEALTH_API_URL";

/// Raw `config.toml` contents. Every field is optional so files can be
/// partial and layered.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub github: GithubSettings,

    #[serde(default)]
    pub cache: CacheSettings,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct GithubSettings {
    /// Personal access token
    pub token: Option<String>,

    /// GraphQL endpoint (default: https://api.github.com/graphql)
    pub api_url: Option<String>,

    /// REST base used for the scope check; derived from `api_url` when unset
    pub rest_url: Option<String>,

    pub timeout_secs: Option<u64>,

    pub allowed_scopes: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
    pub enabled: Option<bool>,

    /// Keep scores on disk for 24 hours
    pub persistent: Option<bool>,

    pub dir: Option<PathBuf>,
}

/// Resolved settings for [`crate::github::GithubClient`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GithubConfig {
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub api_url: String,
    pub rest_url: String,
    pub timeout_secs: u64,
    pub allowed_scopes: Vec<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            rest_url: DEFAULT_REST_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            allowed_scopes: DEFAULT_ALLOWED_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Resolved settings for [`crate::cache::ScoreCache`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub persistent: bool,
    /// Base cache dir; `None` means the platform default
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            persistent: true,
            dir: None,
        }
    }
}

/// REST base for a GraphQL endpoint.
///
/// `https://api.github.com/graphql` maps to `https://api.github.com`,
/// GitHub Enterprise's `https://host/api/graphql` to `https://host/api/v3`.
pub fn rest_url_for(api_url: &str) -> String {
    let trimmed = api_url.trim_end_matches('/');
    if let Some(base) = trimmed.strip_suffix("/api/graphql") {
        return format!("{base}/api/v3");
    }
    trimmed
        .strip_suffix("/graphql")
        .unwrap_or(trimmed)
        .to_string()
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/repohealth/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = match Self::user_config_path() {
            Some(path) => Self::load_from(&path),
            None => UserConfig::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Read a config file; a missing or invalid file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return UserConfig::default();
        }
        match Self::read_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file {}: {:#}", path.display(), e);
                UserConfig::default()
            }
        }
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid TOML in {}", path.display()))
    }

    /// Environment variables override the file
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(token) = get(TOKEN_ENV) {
            self.github.token = Some(token);
        }
        if let Some(url) = get(API_URL_ENV) {
            self.github.api_url = Some(url);
        }
        if let Some(dir) = get(crate::cache::CACHE_DIR_ENV) {
            self.cache.dir = Some(PathBuf::from(dir));
        }
    }

    /// Get the user config directory path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("repohealth").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: UserConfig) {
        let UserConfig { github, cache } = other;
        if github.token.is_some() {
            self.github.token = github.token;
        }
        if github.api_url.is_some() {
            self.github.api_url = github.api_url;
        }
        if github.rest_url.is_some() {
            self.github.rest_url = github.rest_url;
        }
        if github.timeout_secs.is_some() {
            self.github.timeout_secs = github.timeout_secs;
        }
        if github.allowed_scopes.is_some() {
            self.github.allowed_scopes = github.allowed_scopes;
        }
        if cache.enabled.is_some() {
            self.cache.enabled = cache.enabled;
        }
        if cache.persistent.is_some() {
            self.cache.persistent = cache.persistent;
        }
        if cache.dir.is_some() {
            self.cache.dir = cache.dir;
        }
    }

    pub fn has_token(&self) -> bool {
        self.github
            .token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// GitHub settings with defaults filled in
    pub fn github_config(&self) -> GithubConfig {
        let defaults = GithubConfig::default();
        let api_url = self.github.api_url.clone().unwrap_or(defaults.api_url);
        let rest_url = self
            .github
            .rest_url
            .clone()
            .unwrap_or_else(|| rest_url_for(&api_url));
        GithubConfig {
            token: self.github.token.clone(),
            api_url,
            rest_url,
            timeout_secs: self.github.timeout_secs.unwrap_or(defaults.timeout_secs),
            allowed_scopes: self
                .github
                .allowed_scopes
                .clone()
                .unwrap_or(defaults.allowed_scopes),
        }
    }

    /// Cache settings with defaults filled in
    pub fn cache_config(&self) -> CacheConfig {
        let defaults = CacheConfig::default();
        CacheConfig {
            enabled: self.cache.enabled.unwrap_or(defaults.enabled),
            persistent: self.cache.persistent.unwrap_or(defaults.persistent),
            dir: self.cache.dir.clone(),
        }
    }

    /// Initialize user config directory and create example config
    pub fn init_user_config() -> Result<PathBuf> {
        let config_path = Self::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::write_example(&config_path)?;
        Ok(config_path)
    }

    /// Write the example file unless one already exists
    pub fn write_example(config_path: &Path) -> Result<bool> {
        if config_path.exists() {
            return Ok(false);
        }
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let example = r#"# repohealth User Configuration

[github]
# Classic or fine-grained token. GITHUB_TOKEN overrides this.
# token = "ghp_..."

# GraphQL endpoint; REPOHEALTH_API_URL overrides this.
# For GitHub Enterprise: "https://github.example.com/api/graphql"
# api_url = "https://api.github.com/graphql"

# timeout_secs = 30

# Classic tokens carrying any other scope are refused
# allowed_scopes = ["public_repo", "read:org", "read:user", "user:email", "repo:status"]

[cache]
# enabled = true

# Keep scores on disk for 24 hours (memory entries live for 1 hour)
# persistent = true

# REPOHEALTH_CACHE_DIR overrides this
# dir = "/path/to/cache"
"#;
        std::fs::write(config_path, example)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Ok(true)
    }
}
