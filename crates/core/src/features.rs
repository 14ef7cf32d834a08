//! Fixed-length numeric summary of an extraction, for the classifier's numeric branch.
//!
//! Layout for the standard catalog (33 values):
//! counts of the six measured quantities, then mean/min/max/std for each of
//! them, then the presence flags (document code, any date, standard reference).
//! Every value is divided by a fixed cap taken from the catalog. The caps are
//! heuristics, not a fitted scaler.

use crate::catalog::{FeatureScale, PatternCatalog, PresenceFlag, FEATURE_DIM};
use crate::models::{ExtractionResult, FeatureVector};

pub fn build(catalog: &PatternCatalog, extracted: &ExtractionResult) -> FeatureVector {
    let mut raw = Vec::with_capacity(FEATURE_DIM);
    let mut caps = Vec::with_capacity(FEATURE_DIM);

    for (entry, scale) in catalog.measured() {
        raw.push(extracted.count(entry.fact_type) as f32);
        caps.push(scale.count);
    }

    for (entry, scale) in catalog.measured() {
        let stats = Stats::of(&extracted.numeric_values(entry.fact_type));
        raw.extend([stats.mean, stats.min, stats.max, stats.std]);
        caps.extend(stat_caps(&scale));
    }

    for flag in catalog.presence_flags() {
        raw.push(if has_flag(catalog, extracted, flag) { 1.0 } else { 0.0 });
        caps.push(1.0);
    }

    let mut vector = [0.0f32; FEATURE_DIM];
    for (slot, (value, cap)) in vector.iter_mut().zip(raw.into_iter().zip(caps)) {
        let cap = if cap == 0.0 { 1.0 } else { cap };
        *slot = value / cap;
    }
    FeatureVector::from(vector)
}

fn stat_caps(scale: &FeatureScale) -> [f32; 4] {
    [scale.mean, scale.min, scale.max, scale.std]
}

fn has_flag(catalog: &PatternCatalog, extracted: &ExtractionResult, flag: PresenceFlag) -> bool {
    catalog
        .entries()
        .iter()
        .filter(|e| e.presence == Some(flag))
        .any(|e| extracted.has(e.fact_type))
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Stats {
    mean: f32,
    min: f32,
    max: f32,
    std: f32,
}

impl Stats {
    /// Population statistics; all zero for no values, std zero for one.
    fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let std = if values.len() > 1 {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
        } else {
            0.0
        };
        Self {
            mean: mean as f32,
            min: min as f32,
            max: max as f32,
            std: std as f32,
        }
    }
}
