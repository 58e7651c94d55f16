//! JSON reporter
//!
//! Outputs the full ScoreResult as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use crate::models::ScoreResult;
use anyhow::Result;

/// Render a score as JSON
pub fn render(result: &ScoreResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
