//! Core data models for repohealth
//!
//! These models describe the repository facts fetched for one scoring run
//! and the results produced by the scoring engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of commits fetched from the default branch history
pub const COMMIT_HISTORY_LIMIT: usize = 100;

/// License information reported by GitHub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseInfo {
    pub name: String,
    pub key: String,
}

/// Author of a commit as reported by GitHub.
///
/// Any of the three fields may be missing: commits made with an email that
/// is not linked to an account have no login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CommitAuthor {
    /// Identity used for contributor counting: login, then email, then
    /// display name, lowercased. Empty strings count as absent.
    pub fn identity(&self) -> Option<String> {
        [&self.login, &self.email, &self.name]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// A single commit from the default branch history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub committed_at: DateTime<Utc>,
    #[serde(default)]
    pub author: CommitAuthor,
    /// Whether GitHub reports a valid signature. Fetched, not scored.
    #[serde(default)]
    pub signed: bool,
}

/// Boolean repository settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub issues_enabled: bool,
    pub wiki_enabled: bool,
    pub discussions_enabled: bool,
    pub vulnerability_alerts_enabled: bool,
}

/// Everything known about a repository for one scoring run.
///
/// Absent optional fields are never errors: each scorer documents the value
/// it falls back to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub owner: String,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub primary_language: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub closed_issues: u64,
    pub open_pull_requests: u64,
    pub merged_pull_requests: u64,
    pub releases: u64,
    #[serde(default)]
    pub license: Option<LicenseInfo>,
    pub has_code_of_conduct: bool,
    #[serde(default)]
    pub security_policy_url: Option<String>,
    /// Most recent first
    #[serde(default)]
    pub commits: Vec<CommitRecord>,
    #[serde(default)]
    pub readme: Option<String>,
    #[serde(default)]
    pub contributing: Option<String>,
    #[serde(default)]
    pub features: FeatureFlags,
}

impl RepositorySnapshot {
    /// Timestamp of the most recent activity: the push date, falling back
    /// to the newest commit.
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.pushed_at
            .or_else(|| self.commits.iter().map(|c| c.committed_at).max())
    }
}

/// The six scoring categories
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Documentation,
    Maintenance,
    Quality,
    Community,
    Popularity,
    Security,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Documentation,
        Category::Maintenance,
        Category::Quality,
        Category::Community,
        Category::Popularity,
        Category::Security,
    ];

    /// Fixed weight of this category in the final score
    pub fn weight(&self) -> f64 {
        match self {
            Category::Documentation => 0.20,
            Category::Maintenance => 0.20,
            Category::Quality => 0.15,
            Category::Community => 0.15,
            Category::Popularity => 0.15,
            Category::Security => 0.15,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Documentation => "Documentation",
            Category::Maintenance => "Maintenance",
            Category::Quality => "Quality",
            Category::Community => "Community",
            Category::Popularity => "Popularity",
            Category::Security => "Security",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Documentation => write!(f, "documentation"),
            Category::Maintenance => write!(f, "maintenance"),
            Category::Quality => write!(f, "quality"),
            Category::Community => write!(f, "community"),
            Category::Popularity => write!(f, "popularity"),
            Category::Security => write!(f, "security"),
        }
    }
}

/// Output of a single category scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    /// Score in [0, 1]
    pub score: f64,
    pub details: String,
    /// Sub-metric name -> value in [0, 1], in evaluation order
    pub breakdown: Vec<(String, f64)>,
}

impl CategoryResult {
    /// Look up a sub-metric by name
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.breakdown
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

/// A category as it appears in the final result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Score on the 0-10 scale, rounded to one decimal
    pub score: f64,
    pub details: String,
    pub weight: f64,
    #[serde(default)]
    pub breakdown: BTreeMap<String, f64>,
}

/// Repository facts echoed back with the score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

impl From<&RepositorySnapshot> for RepositorySummary {
    fn from(s: &RepositorySnapshot) -> Self {
        Self {
            name: s.name.clone(),
            full_name: s.full_name.clone(),
            description: s.description.clone(),
            url: s.url.clone(),
            stars: s.stars,
            forks: s.forks,
            watchers: s.watchers,
            open_issues: s.open_issues,
            license: s.license.as_ref().map(|l| l.name.clone()),
            language: s.primary_language.clone(),
            pushed_at: s.pushed_at,
        }
    }
}

/// Bookkeeping attached to every result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMetadata {
    pub scoring_version: String,
    pub category_weights: BTreeMap<Category, f64>,
    pub calculated_at: DateTime<Utc>,
}

/// Final health score for one repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Composite score in [0, 10], one decimal
    pub final_score: f64,
    pub grade: String,
    pub categories: BTreeMap<Category, CategoryScore>,
    pub repository: RepositorySummary,
    pub metadata: ScoreMetadata,
}
