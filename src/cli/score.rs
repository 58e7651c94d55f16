//! Score command - fetch, score and report one repository

use crate::cache::ScoreCache;
use crate::config::UserConfig;
use crate::github::{GithubClient, GithubError, RepoRef};
use crate::pipeline::Pipeline;
use crate::reporters::{self, OutputFormat, ReportOptions};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub struct ScoreArgs<'a> {
    pub format: &'a str,
    pub output: Option<&'a Path>,
    pub no_cache: bool,
    pub explain: bool,
    pub skip_token_check: bool,
}

/// One-line hint for errors a user can act on
fn hint_for(err: &GithubError) -> Option<String> {
    match err {
        GithubError::MissingToken => {
            Some("Create a token at https://github.com/settings/tokens".to_string())
        }
        GithubError::Unauthorized(_) => Some("Check that the token is valid and not expired".to_string()),
        GithubError::InsufficientScopes { granted, .. } => Some(format!(
            "Token scopes: {}. Use a token limited to read access, or pass --skip-token-check",
            granted.join(", ")
        )),
        GithubError::RateLimited { .. } => {
            Some("Wait for the reset, or use cached scores (omit --no-cache)".to_string())
        }
        GithubError::NotFound { .. } => {
            Some("Private repositories need a token that can see them".to_string())
        }
        _ => None,
    }
}

fn with_hint(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<GithubError>().and_then(hint_for) {
        Some(hint) => err.context(hint),
        None => err,
    }
}

pub fn run(config: &UserConfig, repo: &RepoRef, args: ScoreArgs<'_>) -> Result<()> {
    let format = OutputFormat::from_str(args.format)?;
    let client = GithubClient::from_config(&config.github_config())
        .map_err(|e| with_hint(e.into()))?;

    if !args.skip_token_check {
        let scopes = client
            .require_allowed_scopes()
            .map_err(|e| with_hint(e.into()))?;
        info!("Token scopes OK: {:?}", scopes.granted);
    }

    let cache = ScoreCache::from_config(&config.cache_config());
    let outcome = Pipeline::new(&client, &cache)
        .force_refresh(args.no_cache)
        .run(repo)
        .map_err(with_hint)
        .with_context(|| format!("Failed to score {}", repo))?;

    if outcome.from_cache {
        eprintln!(
            "{}",
            style(format!(
                "Using cached score from {} (--no-cache to refresh)",
                outcome.computed_at.format("%Y-%m-%d %H:%M UTC")
            ))
            .dim()
        );
    }

    let options = ReportOptions {
        explain: args.explain,
        color: args.output.is_none() && console::colors_enabled(),
    };
    let rendered = reporters::report_with_format(&outcome.result, format, options)?;

    match args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Report written to {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
