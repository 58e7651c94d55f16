//! Scoring pipeline
//!
//! Orchestrates one scoring run:
//! 1. Check the score cache
//! 2. On a miss, fetch the repository and its workflow listing in parallel
//! 3. Score the snapshot
//! 4. Store the result

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::cache::ScoreCache;
use crate::github::{GithubClient, RepoRef};
use crate::models::ScoreResult;
use crate::scoring::calculate_repository_score;

/// Outcome of a scoring run
#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    pub repo: RepoRef,
    pub result: ScoreResult,
    /// Served from the cache without touching the network
    pub from_cache: bool,
    /// When the served result was computed
    pub computed_at: DateTime<Utc>,
    /// Whether a fresh result was written to every cache layer
    pub cached: bool,
}

/// Scores repositories through a shared client and cache.
pub struct Pipeline<'a> {
    client: &'a GithubClient,
    cache: &'a ScoreCache,
    /// Skip the cache lookup (the fresh result is still stored)
    force_refresh: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(client: &'a GithubClient, cache: &'a ScoreCache) -> Self {
        Self {
            client,
            cache,
            force_refresh: false,
        }
    }

    /// Ignore cached scores for this run.
    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    /// Score a repository, serving a fresh cached result when available.
    pub fn run(&self, repo: &RepoRef) -> Result<ScoreOutcome> {
        if !self.force_refresh {
            if let Some(entry) = self.cache.lookup_at(&repo.owner, &repo.repo, Utc::now()) {
                info!("Using cached score for {} ({})", repo, entry.created_at);
                return Ok(ScoreOutcome {
                    repo: repo.clone(),
                    result: entry.payload,
                    from_cache: true,
                    computed_at: entry.created_at,
                    cached: true,
                });
            }
        }

        let result = self.compute(repo)?;
        let cached = self.cache.cache_score(&repo.owner, &repo.repo, &result);
        if !cached && self.cache.is_enabled() {
            debug!("Score for {} was not stored in every cache layer", repo);
        }

        Ok(ScoreOutcome {
            repo: repo.clone(),
            computed_at: result.metadata.calculated_at,
            result,
            from_cache: false,
            cached,
        })
    }

    /// Fetch and score without consulting the cache
    pub fn compute(&self, repo: &RepoRef) -> Result<ScoreResult> {
        info!("Fetching {} from GitHub", repo);
        let (snapshot, workflows) = rayon::join(
            || self.client.fetch_repository_snapshot(&repo.owner, &repo.repo),
            || self.client.fetch_workflow_listing(&repo.owner, &repo.repo),
        );
        let snapshot = snapshot?;

        debug!(
            "Fetched {}: {} commits, {} workflows",
            repo,
            snapshot.commits.len(),
            workflows.as_ref().map(Vec::len).unwrap_or(0)
        );

        Ok(calculate_repository_score(&snapshot, workflows.as_deref()))
    }
}
