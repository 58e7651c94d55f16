//! Cache command - inspect, clear or forget persisted scores

use crate::cache::{CacheEntry, ScoreCache};
use crate::config::{CacheConfig, UserConfig};
use crate::github::RepoRef;
use anyhow::Result;
use chrono::Utc;
use console::style;

/// The persistent cache, even when scoring runs with caching disabled
fn open(config: &UserConfig) -> ScoreCache {
    ScoreCache::from_config(&CacheConfig {
        enabled: true,
        persistent: true,
        ..config.cache_config()
    })
}

fn describe(entry: &CacheEntry, cache: &ScoreCache) -> String {
    let age = Utc::now() - entry.created_at;
    let stale = cache
        .disk_ttl()
        .is_some_and(|ttl| entry.is_expired(ttl, Utc::now()));
    let age_text = if age.num_hours() > 0 {
        format!("{}h ago", age.num_hours())
    } else {
        format!("{}m ago", age.num_minutes().max(0))
    };
    let line = format!(
        "{:<40} {:>4.1} {}  {}",
        entry.key, entry.payload.final_score, entry.payload.grade, age_text
    );
    if stale {
        format!("{} {}", style(line).dim(), style("(stale)").dim())
    } else {
        line
    }
}

/// Show cache location and entries
pub fn status(config: &UserConfig) -> Result<()> {
    let cache = open(config);
    let stats = cache.stats();

    println!("\nrepohealth cache\n");
    if let Some(dir) = &stats.disk_dir {
        println!("  Directory: {}", style(dir.display()).dim());
    }
    if !config.cache_config().enabled {
        println!(
            "  {} Caching is disabled in config; scores are not stored",
            style("[--]").dim()
        );
    }

    let entries = cache.persisted_entries();
    if entries.is_empty() {
        println!(
            "  {} No cached scores. Run {}",
            style("[--]").dim(),
            style("repohealth score owner/repo").cyan()
        );
        return Ok(());
    }

    println!(
        "  {} {} cached score{}\n",
        style("[OK]").green(),
        style(entries.len()).cyan(),
        if entries.len() == 1 { "" } else { "s" }
    );
    for entry in entries.iter().rev() {
        println!("  {}", describe(entry, &cache));
    }
    println!();
    Ok(())
}

/// Remove all cached scores
pub fn clear(config: &UserConfig, dry_run: bool) -> Result<()> {
    let cache = open(config);
    let entries = cache.persisted_entries();
    let count = cache.stats().disk_entries;

    if count == 0 {
        println!("No cached scores found.");
        return Ok(());
    }

    println!(
        "Found {} cached score{}:",
        count,
        if count == 1 { "" } else { "s" }
    );
    for entry in &entries {
        println!("  {}", entry.key);
    }

    if dry_run {
        println!("\nDry run - nothing removed. Run without --dry-run to delete.");
        return Ok(());
    }

    let removed = cache.clear();
    println!(
        "\nRemoved {} cached score{}.",
        removed,
        if removed == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Remove one repository's cached score
pub fn forget(config: &UserConfig, repo: &RepoRef) -> Result<()> {
    let cache = open(config);
    if cache.invalidate(&repo.owner, &repo.repo) {
        println!("Removed cached score for {}", repo);
    } else {
        println!("No cached score for {}", repo);
    }
    Ok(())
}
