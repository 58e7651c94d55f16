//! CLI command definitions and handlers

mod cache;
mod doctor;
mod score;

use crate::config::UserConfig;
use crate::github::RepoRef;
use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;

/// repohealth - GitHub repository health scores
///
/// Fetches repository metadata through the GitHub GraphQL API and combines
/// six weighted categories into a 0-10 score.
#[derive(Parser, Debug)]
#[command(name = "repohealth")]
#[command(
    version,
    about = "Score the health of a GitHub repository on a 0-10 scale",
    after_help = "\
Examples:
  repohealth score rust-lang/cargo                 Score a repository
  repohealth score https://github.com/tokio-rs/tokio --format json
  repohealth score serde-rs/serde --explain        Show every sub-metric
  repohealth cache status                          Show cached scores
  repohealth doctor                                Check token and scopes

Set GITHUB_TOKEN or run `repohealth config init` to configure a token."
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// GitHub token (overrides GITHUB_TOKEN and the config file)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// GraphQL endpoint (overrides REPOHEALTH_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a repository
    #[command(after_help = "\
Examples:
  repohealth score owner/repo                      Text report
  repohealth score owner/repo --format json -o score.json
  repohealth score owner/repo --format markdown    For PR comments
  repohealth score owner/repo --no-cache           Ignore cached scores")]
    Score {
        /// Repository as owner/repo or a GitHub URL
        #[arg(value_parser = parse_repo)]
        repo: RepoRef,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Ignore cached scores and fetch fresh data
        #[arg(long)]
        no_cache: bool,

        /// Explain the scoring formula with full breakdown
        #[arg(long)]
        explain: bool,

        /// Skip the token scope check
        #[arg(long)]
        skip_token_check: bool,
    },

    /// Inspect or clear cached scores
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Check token, scopes and cache directory
    Doctor,

    /// Manage user configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show cache location and entries
    Status,
    /// Remove all cached scores
    Clear {
        /// Show what would be removed without removing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove the cached score of one repository
    Forget {
        #[arg(value_parser = parse_repo)]
        repo: RepoRef,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize config file with example settings
    Init,
    /// Show current config and paths
    Show,
}

fn parse_repo(s: &str) -> Result<RepoRef, String> {
    s.parse()
}

/// Config from file and environment, with CLI flags on top
fn resolve_config(cli: &Cli) -> Result<UserConfig> {
    let mut config = UserConfig::load()?;
    let mut overrides = UserConfig::default();
    overrides.github.token = cli.token.clone();
    overrides.github.api_url = cli.api_url.clone();
    if cli.api_url.is_some() {
        // A CLI endpoint wins over a REST base derived for another host
        overrides.github.rest_url = cli.api_url.as_deref().map(crate::config::rest_url_for);
    }
    config.merge(overrides);
    Ok(config)
}

/// Run the parsed command
pub fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Score {
            repo,
            format,
            output,
            no_cache,
            explain,
            skip_token_check,
        } => score::run(
            &config,
            &repo,
            score::ScoreArgs {
                format: &format,
                output: output.as_deref(),
                no_cache,
                explain,
                skip_token_check,
            },
        ),

        Commands::Cache { action } => match action {
            CacheAction::Status => cache::status(&config),
            CacheAction::Clear { dry_run } => cache::clear(&config, dry_run),
            CacheAction::Forget { repo } => cache::forget(&config, &repo),
        },

        Commands::Doctor => doctor::run(&config),

        Commands::Config { action } => run_config_action(action, &config),

        Commands::Version => {
            println!("repohealth {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_config_action(action: ConfigAction, config: &UserConfig) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = UserConfig::init_user_config()?;
            println!("Config initialized at: {}", path.display());
            println!("\nEdit to add your token:");
            println!("  {}", path.display());
            println!("\nOr set via environment:");
            println!("  export GITHUB_TOKEN=\"ghp_...\"");
            Ok(())
        }
        ConfigAction::Show => show_config(config),
    }
}

fn show_config(config: &UserConfig) -> Result<()> {
    println!("Config path:");
    if let Some(user_path) = UserConfig::user_config_path() {
        let status = if user_path.exists() {
            style("✓").green().to_string()
        } else {
            style("(not found)").dim().to_string()
        };
        println!("  {} {}", user_path.display(), status);
    }
    println!();

    let github = config.github_config();
    let token_status = if config.has_token() {
        style("✓ configured").green()
    } else {
        style("✗ not set").red()
    };
    println!("GitHub:");
    println!("  Token:          {}", token_status);
    println!("  GraphQL URL:    {}", github.api_url);
    println!("  REST URL:       {}", github.rest_url);
    println!("  Timeout:        {}s", github.timeout_secs);
    println!("  Allowed scopes: {}", github.allowed_scopes.join(", "));
    println!();

    let cache = config.cache_config();
    println!("Cache:");
    println!("  Enabled:    {}", cache.enabled);
    println!("  Persistent: {}", cache.persistent);
    println!(
        "  Directory:  {}",
        crate::cache::get_scores_dir(cache.dir.as_deref()).display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_score_command() {
        let cli = Cli::try_parse_from([
            "repohealth",
            "score",
            "https://github.com/serde-rs/serde.git",
            "--format",
            "json",
            "--no-cache",
        ])
        .unwrap();
        match cli.command {
            Commands::Score {
                repo,
                format,
                no_cache,
                explain,
                ..
            } => {
                assert_eq!(repo, RepoRef::new("serde-rs", "serde"));
                assert_eq!(format, "json");
                assert!(no_cache);
                assert!(!explain);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_invalid_repo_rejected() {
        assert!(Cli::try_parse_from(["repohealth", "score", "not-a-repo"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "repohealth",
            "cache",
            "clear",
            "--dry-run",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(
            cli.command,
            Commands::Cache {
                action: CacheAction::Clear { dry_run: true }
            }
        ));
    }

    #[test]
    fn test_cli_overrides_win() {
        let cli = Cli::try_parse_from([
            "repohealth",
            "--token",
            "cli-token",
            "--api-url",
            "http://127.0.0.1:9999/graphql",
            "doctor",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        let github = config.github_config();
        assert_eq!(github.token.as_deref(), Some("cli-token"));
        assert_eq!(github.api_url, "http://127.0.0.1:9999/graphql");
        assert_eq!(github.rest_url, "http://127.0.0.1:9999");
    }
}
