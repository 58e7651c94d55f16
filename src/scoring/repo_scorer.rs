//! Aggregates the six category scores into the final health score

use super::categories::{
    score_community, score_documentation, score_maintenance, score_popularity, score_quality,
    score_security,
};
use super::normalize::round1;
use crate::models::{
    Category, CategoryResult, CategoryScore, RepositorySnapshot, RepositorySummary,
    ScoreMetadata, ScoreResult,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Version of the scoring formula, stored with every result
pub const SCORING_VERSION: &str = "2.0.0";

/// Tolerance used when checking that weights sum to 1.0
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Sum of all category weights
pub fn total_weight() -> f64 {
    Category::ALL.iter().map(Category::weight).sum()
}

/// Check that the fixed category weights sum to 1.0
pub fn weights_are_valid() -> bool {
    (total_weight() - 1.0).abs() < WEIGHT_TOLERANCE
}

/// Run a single category scorer
pub fn score_category(
    category: Category,
    snapshot: &RepositorySnapshot,
    workflows: Option<&[String]>,
    now: DateTime<Utc>,
) -> CategoryResult {
    match category {
        Category::Documentation => score_documentation(snapshot),
        Category::Maintenance => score_maintenance(snapshot, now),
        Category::Quality => score_quality(workflows),
        Category::Community => score_community(snapshot),
        Category::Popularity => score_popularity(snapshot),
        Category::Security => score_security(snapshot),
    }
}

/// Score a repository using the current time
pub fn calculate_repository_score(
    snapshot: &RepositorySnapshot,
    workflows: Option<&[String]>,
) -> ScoreResult {
    calculate_repository_score_at(snapshot, workflows, Utc::now())
}

/// Score a repository as of `now`.
///
/// Deterministic for a fixed `now`; total for any snapshot.
pub fn calculate_repository_score_at(
    snapshot: &RepositorySnapshot,
    workflows: Option<&[String]>,
    now: DateTime<Utc>,
) -> ScoreResult {
    debug_assert!(weights_are_valid(), "category weights must sum to 1.0");

    let mut categories = BTreeMap::new();
    let mut weighted_sum = 0.0;

    for category in Category::ALL {
        let result = score_category(category, snapshot, workflows, now);
        let weight = category.weight();
        weighted_sum += result.score * weight;

        debug!(
            "{}: {:.3} (weight {:.2}) - {}",
            category, result.score, weight, result.details
        );

        categories.insert(
            category,
            CategoryScore {
                score: round1(result.score * 10.0),
                details: result.details,
                weight,
                breakdown: result.breakdown.into_iter().collect(),
            },
        );
    }

    let final_score = round1(weighted_sum * 10.0).clamp(0.0, 10.0);
    let grade = grade_for(final_score).to_string();

    info!(
        "Health score for {}: {:.1}/10 ({})",
        snapshot.full_name, final_score, grade
    );

    ScoreResult {
        final_score,
        grade,
        categories,
        repository: RepositorySummary::from(snapshot),
        metadata: ScoreMetadata {
            scoring_version: SCORING_VERSION.to_string(),
            category_weights: Category::ALL.iter().map(|c| (*c, c.weight())).collect(),
            calculated_at: now,
        },
    }
}

/// Letter grade for a 0-10 score
pub fn grade_for(score: f64) -> &'static str {
    if score >= 8.5 {
        "A"
    } else if score >= 7.0 {
        "B"
    } else if score >= 5.5 {
        "C"
    } else if score >= 4.0 {
        "D"
    } else {
        "F"
    }
}

/// Generate a human-readable explanation of a score
pub fn explain(result: &ScoreResult) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "# Health Score: {:.1}/10 ({})\n",
        result.final_score, result.grade
    ));

    lines.push("## Scoring Formula\n".to_string());
    lines.push("```".to_string());
    let terms: Vec<String> = Category::ALL
        .iter()
        .map(|c| format!("{} × {:.2}", c.label(), c.weight()))
        .collect();
    lines.push(format!("Overall  = ({}) × 10", terms.join(" + ")));
    lines.push("Category = mean(sub-metrics), each in [0, 1]".to_string());
    lines.push("```\n".to_string());

    for (category, score) in &result.categories {
        lines.push(format!(
            "## {} Score: {:.1}/10 (weight {:.0}%)\n",
            category.label(),
            score.score,
            score.weight * 100.0
        ));
        lines.push(format!("- {}", score.details));
        for (name, value) in &score.breakdown {
            lines.push(format!("  - {}: {:.2}", name, value));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "Scoring version {}, calculated at {}",
        result.metadata.scoring_version,
        result.metadata.calculated_at.to_rfc3339()
    ));

    lines.join("\n")
}
