//! GitHub fetch boundary
//!
//! Two GraphQL queries feed the scorers: one for repository metadata and
//! history, one for the `.github/workflows` listing. A REST call to `/user`
//! reads the token's OAuth scopes.
//!
//! # Environment Variables
//!
//! - `GITHUB_TOKEN`: personal access token (required)
//! - `REPOHEALTH_API_URL`: GraphQL endpoint override, e.g. for GitHub Enterprise

mod client;
pub mod queries;

pub use client::{GithubClient, TokenScopes};

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from the GitHub API
#[derive(Error, Debug)]
pub enum GithubError {
    #[error("Repository not found: {owner}/{repo}")]
    NotFound { owner: String, repo: String },

    #[error("GitHub rejected the token: {0}")]
    Unauthorized(String),

    #[error("Access forbidden: {0}")]
    Forbidden(String),

    #[error("Token has scopes outside the allow-list: {}", .disallowed.join(", "))]
    InsufficientScopes {
        granted: Vec<String>,
        disallowed: Vec<String>,
    },

    #[error("GitHub rate limit exceeded{}", reset_suffix(.reset_at))]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Failed to parse API response: {0}")]
    Parse(String),

    #[error("Missing GitHub token: set GITHUB_TOKEN or pass --token")]
    MissingToken,
}

pub type GithubResult<T> = Result<T, GithubError>;

fn reset_suffix(reset_at: &Option<DateTime<Utc>>) -> String {
    reset_at
        .map(|t| format!(" (resets at {})", t.to_rfc3339()))
        .unwrap_or_default()
}

/// An `owner/repo` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

fn valid_segment(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl FromStr for RepoRef {
    type Err = String;

    /// Accepts `owner/repo`, `github.com/owner/repo` and full URLs,
    /// with or without a trailing `.git` or slash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let without_scheme = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed);
        let path = without_scheme
            .strip_prefix("www.github.com/")
            .or_else(|| without_scheme.strip_prefix("github.com/"))
            .or_else(|| without_scheme.strip_prefix("git@github.com:"))
            .unwrap_or(without_scheme);

        let mut parts = path.trim_end_matches('/').splitn(3, '/');
        let owner = parts.next().unwrap_or_default();
        let repo = parts.next().unwrap_or_default();
        let repo = repo.strip_suffix(".git").unwrap_or(repo);

        if !valid_segment(owner) || !valid_segment(repo) {
            return Err(format!(
                "invalid repository '{}': expected owner/repo or a GitHub URL",
                s
            ));
        }
        Ok(Self::new(owner, repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_repo() {
        let r: RepoRef = "rust-lang/rust".parse().unwrap();
        assert_eq!(r, RepoRef::new("rust-lang", "rust"));
        assert_eq!(r.to_string(), "rust-lang/rust");
    }

    #[test]
    fn test_parse_urls() {
        for input in [
            "https://github.com/serde-rs/serde",
            "https://github.com/serde-rs/serde.git",
            "http://www.github.com/serde-rs/serde/",
            "github.com/serde-rs/serde",
            "git@github.com:serde-rs/serde.git",
            "https://github.com/serde-rs/serde/tree/master/serde",
        ] {
            let r: RepoRef = input.parse().unwrap_or_else(|e| panic!("{input}: {e}"));
            assert_eq!(r, RepoRef::new("serde-rs", "serde"), "{input}");
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "justone", "/repo", "owner/", "a b/c", "owner/.."] {
            assert!(input.parse::<RepoRef>().is_err(), "{input}");
        }
    }

    #[test]
    fn test_rate_limit_message() {
        let err = GithubError::RateLimited { reset_at: None };
        assert_eq!(err.to_string(), "GitHub rate limit exceeded");

        let reset = DateTime::from_timestamp(0, 0);
        let err = GithubError::RateLimited { reset_at: reset };
        assert!(err.to_string().contains("resets at 1970-01-01"));
    }
}
