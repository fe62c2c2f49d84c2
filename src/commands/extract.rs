//! Extract command - Show what would be pushed for a saved page

use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::{
    difficulty::DifficultyCache,
    extractor::CodeExtractor,
    metadata::extract_problem_data,
    page::PageSnapshot,
    problem::ProblemSubmission,
};

pub async fn execute(html: &Path, url: &str, description: bool) -> Result<()> {
    let submission = extract_from_file(html, url, description)?;
    println!("{}", serde_json::to_string_pretty(&submission)?);

    if submission.code.is_empty() {
        eprintln!("{}", "⚠ Could not extract code from editor".yellow());
    }
    Ok(())
}

pub fn extract_from_file(html: &Path, url: &str, description: bool) -> Result<ProblemSubmission> {
    let markup = std::fs::read_to_string(html)
        .with_context(|| format!("cannot read {}", html.display()))?;
    let page = PageSnapshot::new(url, &markup, HashMap::new());

    let mut cache = DifficultyCache::default();
    cache.observe(&page);

    Ok(extract_problem_data(
        &page,
        &cache,
        &CodeExtractor::default(),
        description,
    ))
}
