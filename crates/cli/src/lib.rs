//! Public library modules for the CLI crate
pub mod input;
pub mod report;

use anyhow::{bail, Context, Result};
use labdoc_core::config::AppConfig;
use labdoc_core::models::Category;
use labdoc_core::rules::RuleSet;
use labdoc_core::{CategoryDistribution, PatternCatalog, Preprocessor};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Standard catalog plus the configured rule directory, or the built-in rules.
pub fn build_preprocessor(cfg: &AppConfig) -> Result<Preprocessor> {
    let catalog = PatternCatalog::standard().context("building pattern catalog")?;
    let rules = match &cfg.rules.path {
        Some(dir) => RuleSet::load_from_dir(Path::new(dir))
            .with_context(|| format!("loading rules from {dir}"))?,
        None => RuleSet::standard(),
    };
    Ok(Preprocessor::new(Arc::new(catalog), Arc::new(rules)))
}

/// Parses a `{"label": probability}` JSON object into a distribution.
///
/// Labels are read in key order. Labels naming no known category are logged
/// and dropped; two labels naming the same category (e.g. `registro` and
/// `Registro`) are an error.
pub fn parse_probabilities(json: &str) -> Result<CategoryDistribution> {
    let raw: BTreeMap<String, f64> =
        serde_json::from_str(json).context("probabilities must be a JSON object of numbers")?;

    let mut dist = CategoryDistribution::new();
    let mut unknown = Vec::new();
    for (label, p) in raw {
        match label.parse::<Category>() {
            Ok(category) => {
                if dist.get(category).is_some() {
                    bail!("category {category} is given more than once (label {label:?})");
                }
                dist.insert(category, p);
            }
            Err(_) => unknown.push(label),
        }
    }
    if !unknown.is_empty() {
        warn!(labels = ?unknown, "ignoring unknown categories");
    }
    Ok(dist)
}
