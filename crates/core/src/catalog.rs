//! Pattern catalog: the fixed table of fact types recognized in laboratory text.
//!
//! Every other stage (extraction, validation, feature building, substitution)
//! walks this table instead of naming fact types itself. The only per-entry
//! branching is on [`Shape`], which decides how a match is parsed.

use crate::error::CatalogError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::info;

/// Length of the numeric feature vector fed to the classifier.
pub const FEATURE_DIM: usize = 33;

/// Features contributed by each measured quantity: count, mean, min, max, std.
const FEATURES_PER_QUANTITY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FactType {
    #[serde(rename = "codigo_documento")]
    DocumentCode,
    #[serde(rename = "fecha_ddmmyyyy")]
    DateDayFirst,
    #[serde(rename = "fecha_yyyymmdd")]
    DateYearFirst,
    #[serde(rename = "norma_iso")]
    StandardReference,
    #[serde(rename = "temperatura")]
    Temperature,
    #[serde(rename = "presion")]
    Pressure,
    #[serde(rename = "longitud")]
    Length,
    #[serde(rename = "masa")]
    Mass,
    #[serde(rename = "fuerza")]
    Force,
    #[serde(rename = "porcentaje")]
    Percentage,
    #[serde(rename = "numero_general")]
    GenericNumber,
}

impl FactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactType::DocumentCode => "codigo_documento",
            FactType::DateDayFirst => "fecha_ddmmyyyy",
            FactType::DateYearFirst => "fecha_yyyymmdd",
            FactType::StandardReference => "norma_iso",
            FactType::Temperature => "temperatura",
            FactType::Pressure => "presion",
            FactType::Length => "longitud",
            FactType::Mass => "masa",
            FactType::Force => "fuerza",
            FactType::Percentage => "porcentaje",
            FactType::GenericNumber => "numero_general",
        }
    }
}

impl fmt::Display for FactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the captures of a match turn into a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Whole match kept verbatim.
    Code,
    /// Captures are day, month, year.
    DayFirstDate,
    /// Captures are year, month, day.
    YearFirstDate,
    /// Capture 1 is the full reference, capture 2 the standard number.
    StandardReference,
    /// Capture 1 is a decimal number.
    Quantity,
}

impl Shape {
    fn required_captures(&self) -> usize {
        match self {
            Shape::Code | Shape::Quantity => 1,
            Shape::StandardReference => 2,
            Shape::DayFirstDate | Shape::YearFirstDate => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
}

/// Fixed normalization denominators for one measured quantity.
///
/// These are hand-picked caps, not fitted statistics. A zero denominator is
/// treated as 1 when the vector is normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureScale {
    pub count: f32,
    pub mean: f32,
    pub min: f32,
    pub max: f32,
    pub std: f32,
}

impl FeatureScale {
    const fn caps(mean: f32, std: f32) -> Self {
        Self {
            count: 10.0,
            mean,
            min: 0.0,
            max: mean,
            std,
        }
    }
}

/// Boolean "has at least one" feature. Entries sharing a flag are OR-ed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PresenceFlag {
    DocumentCode,
    Date,
    StandardReference,
}

/// Declarative description of one catalog entry, compiled by [`PatternCatalog::from_specs`].
#[derive(Debug, Clone)]
pub struct EntrySpec {
    pub fact_type: FactType,
    pub shape: Shape,
    pub pattern: &'static str,
    pub token: &'static str,
    pub range: Option<ValidRange>,
    pub feature_scale: Option<FeatureScale>,
    pub presence: Option<PresenceFlag>,
}

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub fact_type: FactType,
    pub shape: Shape,
    pub token: &'static str,
    pub range: Option<ValidRange>,
    pub feature_scale: Option<FeatureScale>,
    pub presence: Option<PresenceFlag>,
    regex: Regex,
}

impl CatalogEntry {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Compiled, validated, read-only table of fact types.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    entries: Vec<CatalogEntry>,
}

pub fn standard_specs() -> Vec<EntrySpec> {
    fn text(
        fact_type: FactType,
        shape: Shape,
        pattern: &'static str,
        token: &'static str,
        presence: PresenceFlag,
    ) -> EntrySpec {
        EntrySpec {
            fact_type,
            shape,
            pattern,
            token,
            range: None,
            feature_scale: None,
            presence: Some(presence),
        }
    }

    fn quantity(
        fact_type: FactType,
        pattern: &'static str,
        token: &'static str,
        range: (f64, f64, &'static str),
        scale: FeatureScale,
    ) -> EntrySpec {
        EntrySpec {
            fact_type,
            shape: Shape::Quantity,
            pattern,
            token,
            range: Some(ValidRange {
                min: range.0,
                max: range.1,
                unit: range.2,
            }),
            feature_scale: Some(scale),
            presence: None,
        }
    }

    vec![
        text(
            FactType::DocumentCode,
            Shape::Code,
            r"(?i)\b([A-Z]{2,4}-\d{4}-\d{3,4})\b",
            "<CODIGO_DOC>",
            PresenceFlag::DocumentCode,
        ),
        text(
            FactType::DateDayFirst,
            Shape::DayFirstDate,
            r"(?i)\b(\d{2})/(\d{2})/(\d{4})\b",
            "<FECHA>",
            PresenceFlag::Date,
        ),
        text(
            FactType::DateYearFirst,
            Shape::YearFirstDate,
            r"(?i)\b(\d{4})-(\d{2})-(\d{2})\b",
            "<FECHA>",
            PresenceFlag::Date,
        ),
        text(
            FactType::StandardReference,
            Shape::StandardReference,
            r"(?i)\b(ISO\s+(\d+)[-\d]*)\b",
            "<NORMA_ISO>",
            PresenceFlag::StandardReference,
        ),
        // A minus sign counts only when it is not glued to a preceding word,
        // so "LAB-2025" never reads as -2025.
        quantity(
            FactType::Temperature,
            r"(?i)((?:\B-)?\b\d+\.?\d*)\s*°C\b",
            "<TEMP>",
            (-273.15, 1500.0, "°C"),
            FeatureScale::caps(100.0, 50.0),
        ),
        quantity(
            FactType::Pressure,
            r"(?i)\b(\d+\.?\d*)\s*(?:MPa|Pa|kPa)\b",
            "<PRESION>",
            (0.0, 10_000.0, "MPa"),
            FeatureScale::caps(1000.0, 500.0),
        ),
        quantity(
            FactType::Length,
            r"(?i)\b(\d+\.?\d*)\s*(?:mm|cm|m)\b",
            "<LONGITUD>",
            (0.0, 100_000.0, "mm"),
            FeatureScale::caps(1000.0, 500.0),
        ),
        quantity(
            FactType::Mass,
            r"(?i)\b(\d+\.?\d*)\s*(?:g|kg|ton)\b",
            "<MASA>",
            (0.0, 100_000.0, "kg"),
            FeatureScale::caps(1000.0, 500.0),
        ),
        quantity(
            FactType::Force,
            r"(?i)\b(\d+\.?\d*)\s*(?:N|kN)\b",
            "<FUERZA>",
            (0.0, 1_000_000.0, "N"),
            FeatureScale::caps(10_000.0, 5000.0),
        ),
        // No trailing \b: "%" is not a word character.
        quantity(
            FactType::Percentage,
            r"(?i)\b(\d+\.?\d*)\s*%",
            "<PORCENTAJE>",
            (0.0, 100.0, "%"),
            FeatureScale::caps(100.0, 50.0),
        ),
        EntrySpec {
            fact_type: FactType::GenericNumber,
            shape: Shape::Quantity,
            pattern: r"(?i)\b(\d+\.?\d*)\b",
            token: "<NUM>",
            range: None,
            feature_scale: None,
            presence: None,
        },
    ]
}

impl PatternCatalog {
    /// The built-in laboratory catalog.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::from_specs(&standard_specs())
    }

    pub fn from_specs(specs: &[EntrySpec]) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(specs.len());

        for spec in specs {
            if !seen.insert(spec.fact_type) {
                return Err(CatalogError::DuplicateFactType(spec.fact_type));
            }

            let regex = Regex::new(spec.pattern).map_err(|source| CatalogError::InvalidPattern {
                fact_type: spec.fact_type,
                source,
            })?;

            let expected = spec.shape.required_captures();
            let found = regex.captures_len() - 1;
            if found < expected {
                return Err(CatalogError::MissingCaptureGroup {
                    fact_type: spec.fact_type,
                    expected,
                    found,
                });
            }

            if spec.token.trim().is_empty() {
                return Err(CatalogError::EmptyToken(spec.fact_type));
            }

            if let Some(range) = spec.range {
                if range.min.is_nan() || range.max.is_nan() || range.min > range.max {
                    return Err(CatalogError::InvertedRange {
                        fact_type: spec.fact_type,
                        min: range.min,
                        max: range.max,
                    });
                }
            }

            entries.push(CatalogEntry {
                fact_type: spec.fact_type,
                shape: spec.shape,
                token: spec.token,
                range: spec.range,
                feature_scale: spec.feature_scale,
                presence: spec.presence,
                regex,
            });
        }

        // Substituted text is lowercased, so both spellings must stay inert.
        for entry in &entries {
            let lowered = entry.token.to_lowercase();
            for other in &entries {
                if other.regex.is_match(entry.token) || other.regex.is_match(&lowered) {
                    return Err(CatalogError::MatchableToken {
                        fact_type: entry.fact_type,
                        token: entry.token.to_string(),
                        matched_by: other.fact_type,
                    });
                }
            }
        }

        let catalog = Self { entries };
        let found = catalog.feature_dim();
        if found != FEATURE_DIM {
            return Err(CatalogError::FeatureDimension {
                expected: FEATURE_DIM,
                found,
            });
        }

        info!(entries = catalog.entries.len(), "pattern catalog ready");
        Ok(catalog)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn entry(&self, fact_type: FactType) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.fact_type == fact_type)
    }

    /// Position of `fact_type` in declaration order; unknown types sort last.
    pub fn declaration_index(&self, fact_type: FactType) -> usize {
        self.entries
            .iter()
            .position(|e| e.fact_type == fact_type)
            .unwrap_or(usize::MAX)
    }

    /// Entries that contribute count and statistics features, in feature order.
    pub fn measured(&self) -> impl Iterator<Item = (&CatalogEntry, FeatureScale)> {
        self.entries
            .iter()
            .filter_map(|e| e.feature_scale.map(|scale| (e, scale)))
    }

    /// Distinct presence flags in first-declared order.
    pub fn presence_flags(&self) -> Vec<PresenceFlag> {
        let mut flags = Vec::new();
        for flag in self.entries.iter().filter_map(|e| e.presence) {
            if !flags.contains(&flag) {
                flags.push(flag);
            }
        }
        flags
    }

    pub fn feature_dim(&self) -> usize {
        self.measured().count() * FEATURES_PER_QUANTITY + self.presence_flags().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_declares_eleven_types_in_order() {
        let catalog = PatternCatalog::standard().unwrap();
        let types: Vec<FactType> = catalog.entries().iter().map(|e| e.fact_type).collect();
        assert_eq!(types.len(), 11);
        assert_eq!(types.first(), Some(&FactType::DocumentCode));
        assert_eq!(types.last(), Some(&FactType::GenericNumber));
        assert_eq!(catalog.feature_dim(), FEATURE_DIM);
    }

    #[test]
    fn ranges_only_on_measured_quantities() {
        let catalog = PatternCatalog::standard().unwrap();
        let ranged: Vec<FactType> = catalog
            .entries()
            .iter()
            .filter(|e| e.range.is_some())
            .map(|e| e.fact_type)
            .collect();
        assert_eq!(
            ranged,
            vec![
                FactType::Temperature,
                FactType::Pressure,
                FactType::Length,
                FactType::Mass,
                FactType::Force,
                FactType::Percentage,
            ]
        );
        let temp = catalog.entry(FactType::Temperature).unwrap().range.unwrap();
        assert_eq!(temp.min, -273.15);
        assert_eq!(temp.unit, "°C");
    }

    #[test]
    fn broken_pattern_fails_construction() {
        let mut specs = standard_specs();
        specs[4].pattern = r"(\d+";
        assert!(matches!(
            PatternCatalog::from_specs(&specs),
            Err(CatalogError::InvalidPattern {
                fact_type: FactType::Temperature,
                ..
            })
        ));
    }

    #[test]
    fn date_pattern_without_enough_groups_fails() {
        let mut specs = standard_specs();
        specs[1].pattern = r"\b(\d{2}/\d{2}/\d{4})\b";
        assert!(matches!(
            PatternCatalog::from_specs(&specs),
            Err(CatalogError::MissingCaptureGroup {
                expected: 3,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn numeric_token_is_rejected() {
        let mut specs = standard_specs();
        specs[10].token = "<NUM 0>";
        assert!(matches!(
            PatternCatalog::from_specs(&specs),
            Err(CatalogError::MatchableToken {
                fact_type: FactType::GenericNumber,
                matched_by: FactType::GenericNumber,
                ..
            })
        ));
    }

    #[test]
    fn inverted_range_and_duplicates_fail() {
        let mut specs = standard_specs();
        if let Some(range) = specs[5].range.as_mut() {
            range.min = 20.0;
            range.max = 10.0;
        }
        assert!(matches!(
            PatternCatalog::from_specs(&specs),
            Err(CatalogError::InvertedRange { .. })
        ));

        let mut specs = standard_specs();
        let dup = specs[0].clone();
        specs.push(dup);
        assert!(matches!(
            PatternCatalog::from_specs(&specs),
            Err(CatalogError::DuplicateFactType(FactType::DocumentCode))
        ));
    }

    #[test]
    fn dropping_a_quantity_breaks_the_feature_dimension() {
        let specs: Vec<EntrySpec> = standard_specs()
            .into_iter()
            .filter(|s| s.fact_type != FactType::Force)
            .collect();
        assert!(matches!(
            PatternCatalog::from_specs(&specs),
            Err(CatalogError::FeatureDimension {
                expected: 33,
                found: 28
            })
        ));
    }
}
