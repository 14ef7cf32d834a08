//! Plain-text renderings for the non-JSON output of each command.

use labdoc_core::classifier::Classification;
use labdoc_core::models::Category;
use labdoc_core::{BlendedPrediction, ExtractionResult, FeatureVector, RuleScores, ValidationOutcome};
use std::fmt::Write;

pub fn extraction(result: &ExtractionResult) -> String {
    if result.is_empty() {
        return "no facts found".to_string();
    }
    let mut out = String::new();
    for (fact_type, facts) in result.iter() {
        let _ = writeln!(out, "{fact_type} ({})", facts.len());
        for fact in facts {
            let _ = writeln!(out, "  @{:<6} {:<20} {}", fact.start, fact.raw_text, fact.value);
        }
    }
    out.trim_end().to_string()
}

pub fn validation(outcome: &ValidationOutcome) -> String {
    let mut out = format!(
        "valid: {}, warnings: {}, errors: {}",
        outcome.valid.len(),
        outcome.warnings.len(),
        outcome.errors.len()
    );
    for err in &outcome.errors {
        let _ = write!(
            out,
            "\n  {} {} {}: {}",
            err.fact_type,
            err.value,
            err.unit.unwrap_or(""),
            err.reason.as_deref().unwrap_or("")
        );
    }
    out
}

pub fn features(vector: &FeatureVector) -> String {
    vector
        .iter()
        .map(|v| format!("{v:.4}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn scores(scores: &RuleScores) -> String {
    if scores.is_zero() {
        return "no rule matched".to_string();
    }
    scores
        .iter()
        .map(|(category, score)| format!("{category}: {score:.3}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn prediction(prediction: &BlendedPrediction) -> String {
    let mut out = format!(
        "{} ({:.3})",
        prediction.predicted_category, prediction.confidence
    );
    for (category, p) in prediction.probabilities.iter() {
        let _ = write!(out, "\n  {category}: {p:.3}");
    }
    out
}

pub fn classification(result: &Classification) -> String {
    let source = if result.model_used { "model" } else { "rules only" };
    let review = if result.requires_review {
        "needs review"
    } else {
        "accepted"
    };
    format!("{}\n{source}, {review}", prediction(&result.prediction))
}

pub fn categories() -> String {
    Category::ALL
        .iter()
        .map(|c| {
            if c.is_scored() {
                format!("{c} (rule-scored)")
            } else {
                c.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
