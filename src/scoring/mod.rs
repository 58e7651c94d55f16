//! Repository Health Scoring System
//!
//! Maps heterogeneous, partially-missing repository signals onto six weighted
//! categories and a composite 0-10 score.
//!
//! # Scoring Formula
//!
//! ```text
//! Overall = (Documentation × 0.20 + Maintenance × 0.20 + Quality × 0.15
//!          + Community × 0.15 + Popularity × 0.15 + Security × 0.15) × 10
//!
//! Where each category score:
//!   Category = mean(sub-metrics), every sub-metric in [0, 1]
//! ```
//!
//! # Categories
//!
//! - **Documentation**: README richness, CONTRIBUTING, code of conduct, releases
//! - **Maintenance**: push recency, commit frequency, issue and PR throughput
//! - **Quality**: CI workflows (coverage and linting are not measured yet)
//! - **Community**: distinct contributors, discussions/wiki, code of conduct
//! - **Popularity**: stars and forks (log scale), watchers (linear)
//! - **Security**: vulnerability alerts, security policy
//!
//! Sub-metrics with no data source are fixed constants and show up in the
//! breakdown with their placeholder value.
//!
//! # Example
//!
//! A repository pushed yesterday with 12 commits this quarter, 300 stars,
//! CI workflows and a security policy but no README scores well on
//! maintenance and popularity while documentation drags the total down.

mod categories;
mod normalize;
mod repo_scorer;

pub use categories::{
    contributor_count, readme_score, releases_score, score_community, score_documentation,
    score_maintenance, score_popularity, score_quality, score_security,
    BUILD_STATUS_PARTIAL_CREDIT, DEPENDENCY_HEALTH_NOT_MEASURED, DOWNLOADS_NOT_MEASURED,
    LINTING_NOT_MEASURED, RESPONSE_TIME_NOT_MEASURED, SIGNED_COMMITS_NOT_MEASURED,
    TEST_COVERAGE_NOT_MEASURED,
};
pub use normalize::{normalize_linear, normalize_log, round1};
pub use repo_scorer::{
    calculate_repository_score, calculate_repository_score_at, explain, grade_for,
    score_category, total_weight, weights_are_valid, SCORING_VERSION,
};
