//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for:
//! - README badges sections
//! - Pull request comments

use super::ReportOptions;
use crate::models::ScoreResult;
use crate::scoring::explain;
use anyhow::Result;

fn grade_emoji(grade: &str) -> &'static str {
    match grade {
        "A" => "🏆",
        "B" => "⭐",
        "C" => "⚠️",
        "D" => "❌",
        "F" => "💀",
        _ => "❓",
    }
}

/// Render a score as GitHub-flavored Markdown
pub fn render(result: &ScoreResult, options: ReportOptions) -> Result<String> {
    let mut md = String::new();
    let repo = &result.repository;

    md.push_str(&format!(
        "# {} [{}]({}) Health Report\n\n",
        grade_emoji(&result.grade),
        repo.full_name,
        repo.url
    ));
    md.push_str(&format!(
        "**Grade: {}** | **Score: {:.1}/10**\n\n",
        result.grade, result.final_score
    ));
    if let Some(desc) = repo.description.as_deref().filter(|d| !d.is_empty()) {
        md.push_str(&format!("> {}\n\n", desc));
    }

    md.push_str("## Category Scores\n\n");
    md.push_str("| Category | Score | Weight | Details |\n");
    md.push_str("|----------|------:|-------:|---------|\n");
    for (category, score) in &result.categories {
        md.push_str(&format!(
            "| {} | {:.1} | {:.0}% | {} |\n",
            category.label(),
            score.score,
            score.weight * 100.0,
            score.details.replace('|', "\\|")
        ));
    }
    md.push('\n');

    if options.explain {
        md.push_str(&explain(result));
        md.push_str("\n\n");
    }

    md.push_str(&format!(
        "---\n*Scoring v{}, calculated {}*\n",
        result.metadata.scoring_version,
        result.metadata.calculated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    Ok(md)
}
