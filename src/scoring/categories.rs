//! Category scorers
//!
//! Each scorer is a pure function over a slice of the repository snapshot and
//! returns a score in [0, 1] with a breakdown of its sub-metrics. Scorers never
//! look at each other's output.

use super::normalize::{normalize_linear, normalize_log};
use crate::models::{CategoryResult, RepositorySnapshot};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Sub-metrics with no data source yet. Kept as named constants so the
/// breakdown shows them instead of silently dropping them.
pub const TEST_COVERAGE_NOT_MEASURED: f64 = 0.0;
pub const LINTING_NOT_MEASURED: f64 = 0.0;
pub const RESPONSE_TIME_NOT_MEASURED: f64 = 0.5;
pub const DOWNLOADS_NOT_MEASURED: f64 = 0.5;
pub const DEPENDENCY_HEALTH_NOT_MEASURED: f64 = 0.5;
pub const SIGNED_COMMITS_NOT_MEASURED: f64 = 0.0;
/// Build results are not fetched; every repository gets partial credit
pub const BUILD_STATUS_PARTIAL_CREDIT: f64 = 0.5;

/// Score used for issue/PR ratios when nothing has been filed yet
const NEUTRAL_RATIO: f64 = 0.5;

const README_MIN_CHARS: usize = 500;
const CONTRIBUTING_MIN_CHARS: usize = 100;
const FREQUENCY_WINDOW_DAYS: i64 = 90;
const FREQUENCY_WINDOW_WEEKS: f64 = 12.0;
const TARGET_COMMITS_PER_WEEK: f64 = 2.0;

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s{0,3}#{1,6}\s+\S").expect("valid regex"))
}

fn code_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*(```|~~~)").expect("valid regex"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(!?)\[[^\]]*\]\([^)]+\)").expect("valid regex"))
}

fn image_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)!\[[^\]]*\]\([^)]+\)|<img\s").expect("valid regex"))
}

fn mean(values: &[(&str, f64)]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|(_, v)| v).sum::<f64>() / values.len() as f64
}

fn result(details: String, breakdown: &[(&str, f64)]) -> CategoryResult {
    CategoryResult {
        score: mean(breakdown).clamp(0.0, 1.0),
        details,
        breakdown: breakdown
            .iter()
            .map(|(name, v)| (name.to_string(), *v))
            .collect(),
    }
}

fn present(flag: bool) -> &'static str {
    if flag {
        "present"
    } else {
        "missing"
    }
}

/// README quality: half a point for substance (length + structure), half a
/// point for richness (code, links, images).
pub fn readme_score(readme: Option<&str>) -> f64 {
    let Some(text) = readme else {
        return 0.0;
    };

    let mut score = 0.0;
    let headings = heading_re().find_iter(text).count();
    if text.chars().count() > README_MIN_CHARS && headings >= 2 {
        score += 0.5;
    }

    let has_code = code_fence_re().is_match(text);
    // `![alt](src)` is an image, not a link
    let links = link_re()
        .captures_iter(text)
        .filter(|c| c.get(1).is_some_and(|bang| bang.as_str().is_empty()))
        .count();
    let has_image = image_re().is_match(text);
    if has_code && links >= 2 && has_image {
        score += 0.5;
    }

    f64::min(score, 1.0)
}

/// Graduated credit for published releases
pub fn releases_score(releases: u64) -> f64 {
    match releases {
        0 => 0.0,
        1 => 0.4,
        2..=4 => 0.7,
        _ => 1.0,
    }
}

pub fn score_documentation(snapshot: &RepositorySnapshot) -> CategoryResult {
    let readme = readme_score(snapshot.readme.as_deref());
    let contributing = match snapshot.contributing.as_deref() {
        Some(text) if text.chars().count() > CONTRIBUTING_MIN_CHARS => 1.0,
        _ => 0.0,
    };
    let code_of_conduct = if snapshot.has_code_of_conduct { 1.0 } else { 0.0 };
    let releases = releases_score(snapshot.releases);

    let readme_label = match readme {
        r if r >= 1.0 => "comprehensive",
        r if r > 0.0 => "basic",
        _ if snapshot.readme.is_some() => "minimal",
        _ => "missing",
    };

    let details = format!(
        "README {}, CONTRIBUTING {}, code of conduct {}, {} release{}",
        readme_label,
        present(contributing > 0.0),
        present(snapshot.has_code_of_conduct),
        snapshot.releases,
        if snapshot.releases == 1 { "" } else { "s" }
    );

    result(
        details,
        &[
            ("readme", readme),
            ("contributing", contributing),
            ("code_of_conduct", code_of_conduct),
            ("releases", releases),
        ],
    )
}

fn ratio_or_neutral(done: u64, pending: u64) -> f64 {
    let total = done + pending;
    if total == 0 {
        NEUTRAL_RATIO
    } else {
        done as f64 / total as f64
    }
}

pub fn score_maintenance(snapshot: &RepositorySnapshot, now: DateTime<Utc>) -> CategoryResult {
    let days_since_push = snapshot
        .last_activity()
        .map(|t| (now - t).num_days().max(0));
    let recency = match days_since_push {
        Some(d) if d <= 30 => 1.0,
        Some(d) if d <= 90 => 0.5,
        _ => 0.0,
    };

    let window_start = now - Duration::days(FREQUENCY_WINDOW_DAYS);
    let recent_commits = snapshot
        .commits
        .iter()
        .filter(|c| c.committed_at >= window_start)
        .count();
    let frequency =
        ((recent_commits as f64 / FREQUENCY_WINDOW_WEEKS) / TARGET_COMMITS_PER_WEEK).clamp(0.0, 1.0);

    let issues = ratio_or_neutral(snapshot.closed_issues, snapshot.open_issues);
    let pulls = ratio_or_neutral(snapshot.merged_pull_requests, snapshot.open_pull_requests);

    let last_push = match days_since_push {
        Some(0) => "last push today".to_string(),
        Some(1) => "last push 1 day ago".to_string(),
        Some(d) => format!("last push {d} days ago"),
        None => "no push recorded".to_string(),
    };
    let details = format!(
        "{}, {} commits in the last 90 days, {}/{} issues closed, {}/{} PRs merged",
        last_push,
        recent_commits,
        snapshot.closed_issues,
        snapshot.closed_issues + snapshot.open_issues,
        snapshot.merged_pull_requests,
        snapshot.merged_pull_requests + snapshot.open_pull_requests,
    );

    result(
        details,
        &[
            ("recency", recency),
            ("frequency", frequency),
            ("issue_management", issues),
            ("pr_management", pulls),
        ],
    )
}

pub fn score_quality(workflows: Option<&[String]>) -> CategoryResult {
    let workflow_count = workflows.map(<[String]>::len).unwrap_or(0);
    let has_ci = workflow_count > 0;

    let details = if has_ci {
        format!(
            "{} GitHub Actions workflow{} found",
            workflow_count,
            if workflow_count == 1 { "" } else { "s" }
        )
    } else {
        "no CI workflows found".to_string()
    };

    result(
        details,
        &[
            ("ci_pipeline", if has_ci { 1.0 } else { 0.0 }),
            ("test_coverage", TEST_COVERAGE_NOT_MEASURED),
            ("linting", LINTING_NOT_MEASURED),
            ("build_status", BUILD_STATUS_PARTIAL_CREDIT),
        ],
    )
}

/// Distinct commit authors in the fetched history, at least 1
pub fn contributor_count(snapshot: &RepositorySnapshot) -> usize {
    let identities: HashSet<String> = snapshot
        .commits
        .iter()
        .filter_map(|c| c.author.identity())
        .collect();
    identities.len().max(1)
}

pub fn score_community(snapshot: &RepositorySnapshot) -> CategoryResult {
    let contributors = contributor_count(snapshot);
    let contributors_score = normalize_log(contributors as f64, 1.0, 50.0);
    let features = snapshot.features;
    let has_discussions = features.discussions_enabled || features.wiki_enabled;

    let details = format!(
        "{} contributor{} in recent history, discussions/wiki {}, code of conduct {}",
        contributors,
        if contributors == 1 { "" } else { "s" },
        if has_discussions { "enabled" } else { "disabled" },
        present(snapshot.has_code_of_conduct),
    );

    result(
        details,
        &[
            ("contributors", contributors_score),
            ("discussions", if has_discussions { 1.0 } else { 0.0 }),
            ("response_time", RESPONSE_TIME_NOT_MEASURED),
            (
                "community_health",
                if snapshot.has_code_of_conduct { 1.0 } else { 0.0 },
            ),
        ],
    )
}

pub fn score_popularity(snapshot: &RepositorySnapshot) -> CategoryResult {
    let details = format!(
        "{} stars, {} forks, {} watchers",
        snapshot.stars, snapshot.forks, snapshot.watchers
    );

    result(
        details,
        &[
            ("stars", normalize_log(snapshot.stars as f64, 0.0, 1000.0)),
            ("forks", normalize_log(snapshot.forks as f64, 0.0, 100.0)),
            ("watchers", normalize_linear(snapshot.watchers as f64, 0.0, 50.0)),
            ("downloads", DOWNLOADS_NOT_MEASURED),
        ],
    )
}

pub fn score_security(snapshot: &RepositorySnapshot) -> CategoryResult {
    let alerts = snapshot.features.vulnerability_alerts_enabled;
    let policy = snapshot.security_policy_url.is_some();

    let details = format!(
        "vulnerability alerts {}, security policy {}",
        if alerts { "enabled" } else { "disabled" },
        present(policy),
    );

    result(
        details,
        &[
            ("vulnerability_alerts", if alerts { 1.0 } else { 0.0 }),
            ("dependency_health", DEPENDENCY_HEALTH_NOT_MEASURED),
            ("signed_commits", SIGNED_COMMITS_NOT_MEASURED),
            ("security_practices", if policy { 1.0 } else { 0.0 }),
        ],
    )
}
