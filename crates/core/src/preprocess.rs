use crate::catalog::PatternCatalog;
use crate::config::PreprocessConfig;
use crate::error::CatalogError;
use crate::models::{ExtractionResult, FeatureVector, RuleScores, ValidationOutcome};
use crate::rules::RuleSet;
use crate::{extractor, features, replacer, rules, validator};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessOptions {
    pub create_features: bool,
    pub validate: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            create_features: true,
            validate: true,
        }
    }
}

impl From<&PreprocessConfig> for PreprocessOptions {
    fn from(cfg: &PreprocessConfig) -> Self {
        Self {
            create_features: cfg.create_features,
            validate: cfg.validate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preprocessed {
    pub normalized_text: String,
    pub extracted: ExtractionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationOutcome>,
    pub rule_scores: RuleScores,
}

/// Runs every per-document stage against one shared catalog and rule set.
///
/// Cheap to clone and safe to share across threads; nothing here is mutated
/// after construction.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    catalog: Arc<PatternCatalog>,
    rules: Arc<RuleSet>,
}

impl Preprocessor {
    pub fn new(catalog: Arc<PatternCatalog>, rules: Arc<RuleSet>) -> Self {
        Self { catalog, rules }
    }

    /// Standard catalog and rule table.
    pub fn standard() -> Result<Self, CatalogError> {
        Ok(Self::new(
            Arc::new(PatternCatalog::standard()?),
            Arc::new(RuleSet::standard()),
        ))
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn extract(&self, text: &str) -> ExtractionResult {
        extractor::extract(&self.catalog, text)
    }

    pub fn validate(&self, extracted: &ExtractionResult) -> ValidationOutcome {
        validator::validate(&self.catalog, extracted)
    }

    pub fn features(&self, extracted: &ExtractionResult) -> FeatureVector {
        features::build(&self.catalog, extracted)
    }

    pub fn substitute(&self, text: &str, extracted: &ExtractionResult) -> String {
        replacer::substitute(&self.catalog, text, extracted)
    }

    pub fn score(&self, extracted: &ExtractionResult) -> RuleScores {
        rules::score(&self.rules, extracted)
    }

    pub fn preprocess(&self, text: &str, options: PreprocessOptions) -> Preprocessed {
        let extracted = self.extract(text);
        let validation = options.validate.then(|| self.validate(&extracted));
        let features = options.create_features.then(|| self.features(&extracted));
        let normalized_text = self.substitute(text, &extracted);
        let rule_scores = self.score(&extracted);

        Preprocessed {
            normalized_text,
            extracted,
            features,
            validation,
            rule_scores,
        }
    }
}
