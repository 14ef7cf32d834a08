use crate::catalog::{FactType, FEATURE_DIM};
use crate::error::CategoryError;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// Document categories in canonical order. Ties between categories always
/// resolve to the one declared first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "informe_ensayo")]
    TestReport,
    #[serde(rename = "certificado_calibracion")]
    CalibrationCertificate,
    #[serde(rename = "procedimiento")]
    Procedure,
    #[serde(rename = "registro")]
    Record,
    #[serde(rename = "protocolo")]
    Protocol,
    #[serde(rename = "oferta")]
    Offer,
    #[serde(rename = "contrato")]
    Contract,
    #[serde(rename = "plan_calidad")]
    QualityPlan,
    #[serde(rename = "otro")]
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::TestReport,
        Category::CalibrationCertificate,
        Category::Procedure,
        Category::Record,
        Category::Protocol,
        Category::Offer,
        Category::Contract,
        Category::QualityPlan,
        Category::Other,
    ];

    /// Categories the rule scorer has an opinion on.
    pub const SCORED: [Category; 4] = [
        Category::TestReport,
        Category::CalibrationCertificate,
        Category::Procedure,
        Category::Record,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TestReport => "informe_ensayo",
            Category::CalibrationCertificate => "certificado_calibracion",
            Category::Procedure => "procedimiento",
            Category::Record => "registro",
            Category::Protocol => "protocolo",
            Category::Offer => "oferta",
            Category::Contract => "contrato",
            Category::QualityPlan => "plan_calidad",
            Category::Other => "otro",
        }
    }

    pub fn is_scored(&self) -> bool {
        Self::SCORED.contains(self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| CategoryError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FactValue {
    Number(f64),
    Text(String),
}

impl FactValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FactValue::Number(n) => Some(*n),
            FactValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Number(n) => write!(f, "{n}"),
            FactValue::Text(t) => f.write_str(t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FactExtra {
    Date { day: u32, month: u32, year: i32 },
    Standard { number: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedFact {
    pub fact_type: FactType,
    pub value: FactValue,
    /// Exact matched slice of the original text.
    pub raw_text: String,
    /// Byte offset of the match in the original text.
    pub start: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<FactExtra>,
}

impl ExtractedFact {
    pub fn end(&self) -> usize {
        self.start + self.raw_text.len()
    }
}

/// Facts grouped by type. A type only appears when it matched at least once.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    groups: BTreeMap<FactType, Vec<ExtractedFact>>,
}

impl ExtractionResult {
    pub(crate) fn insert_group(&mut self, fact_type: FactType, mut facts: Vec<ExtractedFact>) {
        if facts.is_empty() {
            return;
        }
        facts.sort_by_key(|f| f.start);
        self.groups.insert(fact_type, facts);
    }

    pub fn get(&self, fact_type: FactType) -> &[ExtractedFact] {
        self.groups
            .get(&fact_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count(&self, fact_type: FactType) -> usize {
        self.get(fact_type).len()
    }

    pub fn has(&self, fact_type: FactType) -> bool {
        self.groups.contains_key(&fact_type)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn fact_types(&self) -> impl Iterator<Item = FactType> + '_ {
        self.groups.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FactType, &[ExtractedFact])> {
        self.groups.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn total_facts(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn numeric_values(&self, fact_type: FactType) -> Vec<f64> {
        self.get(fact_type)
            .iter()
            .filter_map(|f| f.value.as_number())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationEntry {
    pub fact_type: FactType,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub valid: Vec<ValidationEntry>,
    pub warnings: Vec<ValidationEntry>,
    pub errors: Vec<ValidationEntry>,
}

impl ValidationOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Normalized numeric summary of an extraction. Always [`FEATURE_DIM`] long.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; FEATURE_DIM]);

impl FeatureVector {
    pub fn zeros() -> Self {
        Self([0.0; FEATURE_DIM])
    }
}

impl From<[f32; FEATURE_DIM]> for FeatureVector {
    fn from(values: [f32; FEATURE_DIM]) -> Self {
        Self(values)
    }
}

impl Deref for FeatureVector {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

// serde only implements arrays up to 32 elements.
impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

/// Rule-derived likelihood per scored category: all zero, or summing to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuleScores {
    scores: BTreeMap<Category, f64>,
}

impl RuleScores {
    pub fn zero() -> Self {
        Self {
            scores: Category::SCORED.iter().map(|c| (*c, 0.0)).collect(),
        }
    }

    /// Sums raw weights per scored category and divides by the grand total.
    /// Weights for unscored categories are ignored; a zero total stays all zero.
    pub fn normalized<I>(weights: I) -> Self
    where
        I: IntoIterator<Item = (Category, f64)>,
    {
        let mut scores = Self::zero().scores;
        for (category, weight) in weights {
            if let Some(sum) = scores.get_mut(&category) {
                *sum += weight;
            }
        }
        let total: f64 = scores.values().sum();
        if total > 0.0 {
            for v in scores.values_mut() {
                *v /= total;
            }
        }
        Self { scores }
    }

    pub fn get(&self, category: Category) -> f64 {
        self.scores.get(&category).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.scores.values().sum()
    }

    pub fn is_zero(&self) -> bool {
        self.scores.values().all(|v| *v == 0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.scores.iter().map(|(k, v)| (*k, *v))
    }
}

/// Category probabilities as produced by a classifier, iterated in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryDistribution {
    probs: BTreeMap<Category, f64>,
}

impl CategoryDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category, probability: f64) {
        self.probs.insert(category, probability);
    }

    pub fn get(&self, category: Category) -> Option<f64> {
        self.probs.get(&category).copied()
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.probs.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.probs.iter().map(|(k, v)| (*k, *v))
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut f64> {
        self.probs.values_mut()
    }

    /// Parses classifier labels, returning the labels that name no known category.
    pub fn from_labels<I, S>(pairs: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut dist = Self::new();
        let mut unknown = Vec::new();
        for (label, p) in pairs {
            match label.as_ref().parse::<Category>() {
                Ok(category) => dist.insert(category, p),
                Err(_) => unknown.push(label.as_ref().to_string()),
            }
        }
        (dist, unknown)
    }
}

impl FromIterator<(Category, f64)> for CategoryDistribution {
    fn from_iter<T: IntoIterator<Item = (Category, f64)>>(iter: T) -> Self {
        Self {
            probs: iter.into_iter().collect(),
        }
    }
}

impl From<&RuleScores> for CategoryDistribution {
    fn from(scores: &RuleScores) -> Self {
        scores.iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlendedPrediction {
    pub predicted_category: Category,
    pub confidence: f64,
    pub probabilities: CategoryDistribution,
}
