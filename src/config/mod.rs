//! Configuration module for repohealth
//!
//! This module handles:
//! - User-level configuration (~/.config/repohealth/config.toml)
//! - Environment overrides for the token, endpoint and cache dir

mod user_config;

pub use user_config::{
    rest_url_for, CacheConfig, CacheSettings, GithubConfig, GithubSettings, UserConfig,
    API_URL_ENV, DEFAULT_ALLOWED_SCOPES, DEFAULT_API_URL, DEFAULT_REST_URL,
    DEFAULT_TIMEOUT_SECS, TOKEN_ENV,
};
