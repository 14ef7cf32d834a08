//! Rule-based category scoring from the facts found in a document.

use crate::catalog::FactType;
use crate::error::RuleError;
use crate::models::{Category, ExtractionResult, RuleScores};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Present { fact: FactType },
    Absent { fact: FactType },
    CountAtMost { fact: FactType, max: usize },
    CountAtLeast { fact: FactType, min: usize },
    All { all: Vec<Condition> },
    Any { any: Vec<Condition> },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Rule {
    pub name: String,
    pub category: Category,
    pub weight: f64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub condition: Condition,
}

fn enabled_by_default() -> bool {
    true
}

pub fn matches(condition: &Condition, extracted: &ExtractionResult) -> bool {
    match condition {
        Condition::Present { fact } => extracted.has(*fact),
        Condition::Absent { fact } => !extracted.has(*fact),
        Condition::CountAtMost { fact, max } => extracted.count(*fact) <= *max,
        Condition::CountAtLeast { fact, min } => extracted.count(*fact) >= *min,
        Condition::All { all } => all.iter().all(|c| matches(c, extracted)),
        Condition::Any { any } => any.iter().any(|c| matches(c, extracted)),
    }
}

/// Validated set of scoring rules, shared read-only like the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Result<Self, RuleError> {
        for rule in &rules {
            if !rule.category.is_scored() {
                return Err(RuleError::UnscoredCategory {
                    rule: rule.name.clone(),
                    category: rule.category,
                });
            }
            if !rule.weight.is_finite() || rule.weight < 0.0 {
                return Err(RuleError::InvalidWeight {
                    rule: rule.name.clone(),
                    weight: rule.weight,
                });
            }
        }
        Ok(Self { rules })
    }

    /// The laboratory rule table.
    pub fn standard() -> Self {
        use Condition::*;
        use FactType::*;

        let rule = |name: &str, category: Category, weight: f64, condition: Condition| Rule {
            name: name.to_string(),
            category,
            weight,
            enabled: true,
            condition,
        };
        let present = |fact: FactType| Present { fact };

        Self {
            rules: vec![
                rule(
                    "pressure or force measured",
                    Category::TestReport,
                    0.3,
                    Any {
                        any: vec![present(Pressure), present(Force)],
                    },
                ),
                rule(
                    "temperature or mass measured",
                    Category::TestReport,
                    0.2,
                    Any {
                        any: vec![present(Temperature), present(Mass)],
                    },
                ),
                rule(
                    "percentages reported",
                    Category::TestReport,
                    0.2,
                    CountAtLeast {
                        fact: Percentage,
                        min: 1,
                    },
                ),
                rule(
                    "coded document citing a standard",
                    Category::CalibrationCertificate,
                    0.4,
                    All {
                        all: vec![present(DocumentCode), present(StandardReference)],
                    },
                ),
                rule(
                    "few temperature readings",
                    Category::CalibrationCertificate,
                    0.1,
                    CountAtMost {
                        fact: Temperature,
                        max: 2,
                    },
                ),
                rule(
                    "standard without pressure readings",
                    Category::Procedure,
                    0.3,
                    All {
                        all: vec![present(StandardReference), Absent { fact: Pressure }],
                    },
                ),
                rule(
                    "dated",
                    Category::Record,
                    0.2,
                    Any {
                        any: vec![present(DateDayFirst), present(DateYearFirst)],
                    },
                ),
                rule(
                    "coded",
                    Category::Record,
                    0.1,
                    present(DocumentCode),
                ),
            ],
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Reads one rule per `.toml` file, in file-name order.
    pub fn load_from_dir(dir: &Path) -> Result<Self, RuleError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some("toml")
            {
                paths.push(path);
            }
        }
        paths.sort();

        let mut rules = Vec::with_capacity(paths.len());
        for path in paths {
            let content = fs::read_to_string(&path)?;
            let rule: Rule = toml::from_str(&content).map_err(|source| RuleError::Parse {
                path: path.display().to_string(),
                source,
            })?;
            rules.push(rule);
        }

        info!(rules = rules.len(), dir = %dir.display(), "loaded scoring rules");
        Self::new(rules)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Sums the weights of matching rules per category and normalizes by the
/// grand total. With no matching weight every score stays zero.
///
/// A document without any fact carries no rule signal at all, even though
/// count-bounded conditions such as "at most two temperatures" would hold.
pub fn score(rules: &RuleSet, extracted: &ExtractionResult) -> RuleScores {
    if extracted.is_empty() {
        return RuleScores::zero();
    }

    let weights: Vec<(Category, f64)> = rules
        .rules
        .iter()
        .filter(|r| r.enabled && matches(&r.condition, extracted))
        .map(|r| (r.category, r.weight))
        .collect();
    debug!(matched = weights.len(), "scoring rules matched");
    RuleScores::normalized(weights)
}
