//! repohealth - GitHub repository health scores
//!
//! Fetches repository signals through the GitHub GraphQL API, scores six
//! weighted categories and caches the result.
//!
//! ```rust,ignore
//! use repohealth::{cache::ScoreCache, config::UserConfig, github::GithubClient};
//! use repohealth::pipeline::Pipeline;
//!
//! let config = UserConfig::load()?;
//! let client = GithubClient::from_config(&config.github_config())?;
//! let cache = ScoreCache::from_config(&config.cache_config());
//! let outcome = Pipeline::new(&client, &cache).run(&"rust-lang/cargo".parse()?)?;
//! println!("{:.1} ({})", outcome.result.final_score, outcome.result.grade);
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod github;
pub mod models;
pub mod pipeline;
pub mod reporters;
pub mod scoring;
