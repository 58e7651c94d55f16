//! Output reporters for repository health scores
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON (same shape as the cached payload)
//! - `markdown` - GitHub-flavored Markdown, e.g. for PR comments

mod json;
mod markdown;
mod text;

use crate::models::ScoreResult;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// What to include besides the scores
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Show every sub-metric
    pub explain: bool,
    /// ANSI colors in text output
    pub color: bool,
}

/// Render a score in the specified format
pub fn report(result: &ScoreResult, format: &str, options: ReportOptions) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(result, fmt, options)
}

/// Render a score using an OutputFormat enum
pub fn report_with_format(
    result: &ScoreResult,
    format: OutputFormat,
    options: ReportOptions,
) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(result, options),
        OutputFormat::Json => json::render(result),
        OutputFormat::Markdown => markdown::render(result, options),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::RepositorySnapshot;
    use crate::scoring::calculate_repository_score_at;

    /// Score a small but non-trivial repository
    pub(crate) fn test_result() -> ScoreResult {
        let snapshot = RepositorySnapshot {
            owner: "acme".into(),
            name: "widget".into(),
            full_name: "acme/widget".into(),
            description: Some("Widgets for everyone".into()),
            url: "https://github.com/acme/widget".into(),
            stars: 420,
            forks: 37,
            watchers: 12,
            releases: 4,
            readme: Some("# Widget\n\n## Install\n\n```sh\ncargo install widget\n```\n".into()),
            ..Default::default()
        };
        let workflows = vec!["ci.yml".to_string()];
        calculate_repository_score_at(
            &snapshot,
            Some(workflows.as_slice()),
            "2024-06-01T12:00:00Z".parse().unwrap(),
        )
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str("md").unwrap(),
            OutputFormat::Markdown
        );
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for f in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Markdown] {
            assert_eq!(OutputFormat::from_str(&f.to_string()).unwrap(), f);
        }
    }

    #[test]
    fn test_report_dispatch() {
        let result = test_result();
        let json = report(&result, "json", ReportOptions::default()).unwrap();
        assert!(json.trim_start().starts_with('{'));
        assert!(report(&result, "xml", ReportOptions::default()).is_err());
    }
}
