//! Class label files for classification models: one label per line,
//! line number = class index.

use anyhow::{Context, Result};
use std::path::Path;

pub fn load_labels(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read labels '{}'", path.display()))?;
    Ok(parse_labels(&text))
}

/// Trailing blank lines are dropped; inner lines are kept so indices stay aligned.
pub fn parse_labels(text: &str) -> Vec<String> {
    let mut labels: Vec<String> = text.lines().map(|l| l.trim().to_string()).collect();
    while labels.last().is_some_and(|l| l.is_empty()) {
        labels.pop();
    }
    labels
}
