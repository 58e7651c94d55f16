//! Doctor command - check environment

use crate::config::UserConfig;
use crate::github::{GithubClient, GithubError};
use anyhow::{bail, Result};
use console::style;

pub fn run(config: &UserConfig) -> Result<()> {
    println!("repohealth doctor\n");
    let mut failures = 0;

    let github = config.github_config();
    println!("{} GraphQL endpoint: {}", style("✓").green(), github.api_url);

    match GithubClient::from_config(&github) {
        Err(e) => {
            failures += 1;
            println!("{} {}", style("✗").red(), e);
            println!("  Set GITHUB_TOKEN, pass --token, or run `repohealth config init`");
        }
        Ok(client) => {
            println!("{} Token: configured", style("✓").green());
            match client.validate_token() {
                Ok(scopes) if scopes.granted.is_empty() => {
                    println!(
                        "{} Token scopes: none reported (fine-grained token)",
                        style("✓").green()
                    );
                }
                Ok(scopes) if scopes.has_only_allowed => {
                    println!(
                        "{} Token scopes: {}",
                        style("✓").green(),
                        scopes.granted.join(", ")
                    );
                }
                Ok(scopes) => {
                    failures += 1;
                    let extra: Vec<&str> = scopes
                        .disallowed(&github.allowed_scopes)
                        .map(String::as_str)
                        .collect();
                    println!(
                        "{} Token scopes: {} (not allowed: {})",
                        style("✗").red(),
                        scopes.granted.join(", "),
                        extra.join(", ")
                    );
                    println!("  Use a read-only token, or pass --skip-token-check to `score`");
                }
                Err(GithubError::RateLimited { .. }) => {
                    println!(
                        "{} Token check skipped: rate limited",
                        style("○").yellow()
                    );
                }
                Err(e) => {
                    failures += 1;
                    println!("{} Token check failed: {}", style("✗").red(), e);
                }
            }
        }
    }

    let cache = config.cache_config();
    if cache.enabled {
        let dir = crate::cache::get_scores_dir(cache.dir.as_deref());
        let mode = if cache.persistent {
            "memory + disk"
        } else {
            "memory only"
        };
        println!(
            "{} Cache: {} ({})",
            style("✓").green(),
            mode,
            style(dir.display()).dim()
        );
    } else {
        println!("{} Cache: disabled", style("○").yellow());
    }

    if failures > 0 {
        bail!(
            "{} check{} failed",
            failures,
            if failures == 1 { "" } else { "s" }
        );
    }
    println!("\n✅ All checks passed!");
    Ok(())
}
