use crate::catalog::FactType;
use crate::models::Category;
use thiserror::Error;

/// Raised while building a [`crate::catalog::PatternCatalog`]. Never per call.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid pattern for {fact_type}: {source}")]
    InvalidPattern {
        fact_type: FactType,
        #[source]
        source: regex::Error,
    },
    #[error("pattern for {fact_type} needs {expected} capture groups, found {found}")]
    MissingCaptureGroup {
        fact_type: FactType,
        expected: usize,
        found: usize,
    },
    #[error("empty replacement token for {0}")]
    EmptyToken(FactType),
    #[error("token {token} for {fact_type} is matched by the {matched_by} pattern")]
    MatchableToken {
        fact_type: FactType,
        token: String,
        matched_by: FactType,
    },
    #[error("invalid range for {fact_type}: min {min} > max {max}")]
    InvertedRange { fact_type: FactType, min: f64, max: f64 },
    #[error("{0} is declared twice")]
    DuplicateFactType(FactType),
    #[error("catalog yields {found} features, expected {expected}")]
    FeatureDimension { expected: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("reading rules: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing rule file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("rule {rule} targets {category}, which is not rule-scored")]
    UnscoredCategory { rule: String, category: Category },
    #[error("rule {rule} has invalid weight {weight}")]
    InvalidWeight { rule: String, weight: f64 },
}

#[derive(Debug, Error)]
#[error("unknown document category: {0}")]
pub struct CategoryError(pub String);

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("document is {size} bytes, limit is {limit}")]
    DocumentTooLarge { size: usize, limit: usize },
}
