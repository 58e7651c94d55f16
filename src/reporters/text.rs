//! Text (terminal) reporter with colors and formatting

use super::ReportOptions;
use crate::models::{CategoryScore, ScoreResult};
use anyhow::Result;

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Grade colors (ANSI escape codes)
fn grade_color(grade: &str) -> &'static str {
    match grade {
        "A" => "\x1b[32m", // Green
        "B" => "\x1b[92m", // Light green
        "C" => "\x1b[33m", // Yellow
        "D" => "\x1b[91m", // Light red
        "F" => "\x1b[31m", // Red
        _ => RESET,
    }
}

fn score_color(score: f64) -> &'static str {
    if score >= 7.0 {
        "\x1b[32m"
    } else if score >= 4.0 {
        "\x1b[33m"
    } else {
        "\x1b[31m"
    }
}

/// Escape codes, blanked when colors are off
struct Palette {
    on: bool,
}

impl Palette {
    fn get(&self, code: &'static str) -> &'static str {
        if self.on {
            code
        } else {
            ""
        }
    }
}

/// Ten-cell bar for a 0-10 score
fn bar(score: f64) -> String {
    let filled = score.round().clamp(0.0, 10.0) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

fn render_category(out: &mut String, p: &Palette, label: &str, cat: &CategoryScore, explain: bool) {
    let color = p.get(score_color(cat.score));
    let (reset, dim) = (p.get(RESET), p.get(DIM));
    out.push_str(&format!(
        "  {:<14} {color}{} {:>4.1}{reset}  {dim}{:>3.0}%  {}{reset}\n",
        label,
        bar(cat.score),
        cat.score,
        cat.weight * 100.0,
        cat.details
    ));
    if explain {
        for (name, value) in &cat.breakdown {
            out.push_str(&format!("  {dim}    {:<22} {:.2}{reset}\n", name, value));
        }
    }
}

/// Render a score as formatted terminal output
pub fn render(result: &ScoreResult, options: ReportOptions) -> Result<String> {
    let p = Palette { on: options.color };
    let (bold, dim, reset) = (p.get(BOLD), p.get(DIM), p.get(RESET));
    let grade_c = p.get(grade_color(&result.grade));
    let repo = &result.repository;

    let mut out = String::new();

    // Header
    out.push_str(&format!("\n{bold}{}{reset}\n", repo.full_name));
    if let Some(desc) = repo.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("{dim}{}{reset}\n", desc));
    }
    out.push_str(&format!(
        "{dim}──────────────────────────────────────{reset}\n"
    ));
    out.push_str(&format!(
        "Health: {bold}{:.1}/10{reset}  Grade: {grade_c}{bold}{}{reset}\n",
        result.final_score, result.grade
    ));

    let mut facts = vec![
        format!("★ {}", repo.stars),
        format!("forks {}", repo.forks),
        format!("open issues {}", repo.open_issues),
    ];
    if let Some(lang) = &repo.language {
        facts.push(lang.clone());
    }
    if let Some(license) = &repo.license {
        facts.push(license.clone());
    }
    out.push_str(&format!("{dim}{}{reset}\n\n", facts.join("  ·  ")));

    out.push_str(&format!("{bold}CATEGORIES{reset}\n"));
    for (category, score) in &result.categories {
        render_category(&mut out, &p, category.label(), score, options.explain);
    }
    out.push('\n');

    if options.explain {
        let terms: Vec<String> = result
            .categories
            .iter()
            .map(|(c, s)| format!("{}×{:.2}", c.label(), s.weight))
            .collect();
        out.push_str(&format!(
            "{dim}Score = {}; each category is the mean of its sub-metrics × 10{reset}\n\n",
            terms.join(" + ")
        ));
    }

    // Weakest area as a hint
    if let Some((category, score)) = result
        .categories
        .iter()
        .min_by(|a, b| a.1.score.total_cmp(&b.1.score))
    {
        if score.score < 5.0 {
            out.push_str(&format!(
                "{dim}Weakest area: {} ({:.1}/10). Run with --explain for sub-metrics.{reset}\n",
                category.label(),
                score.score
            ));
        }
    }

    out.push_str(&format!(
        "{dim}{} · scoring v{} · {}{reset}\n",
        repo.url,
        result.metadata.scoring_version,
        result.metadata.calculated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_result;

    #[test]
    fn test_render_plain() {
        let result = test_result();
        let out = render(&result, ReportOptions::default()).unwrap();
        assert!(out.contains("acme/widget"));
        assert!(out.contains(&format!("Grade: {}", result.grade)));
        assert!(out.contains("Documentation"));
        assert!(out.contains("Security"));
        assert!(!out.contains('\x1b'), "no ANSI codes without color");
    }

    #[test]
    fn test_render_colored() {
        let options = ReportOptions {
            color: true,
            ..Default::default()
        };
        let out = render(&test_result(), options).unwrap();
        assert!(out.contains(BOLD));
    }

    #[test]
    fn test_explain_lists_sub_metrics() {
        let result = test_result();
        let plain = render(&result, ReportOptions::default()).unwrap();
        assert!(!plain.contains("ci_pipeline"));

        let options = ReportOptions {
            explain: true,
            ..Default::default()
        };
        let explained = render(&result, options).unwrap();
        assert!(explained.contains("ci_pipeline"));
        assert!(explained.contains("readme"));
    }

    #[test]
    fn test_bar_bounds() {
        assert_eq!(bar(0.0).chars().count(), 10);
        assert_eq!(bar(10.0), "█".repeat(10));
        assert_eq!(bar(-3.0), "░".repeat(10));
    }
}
