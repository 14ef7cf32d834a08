use crate::models::{BlendedPrediction, Category, CategoryDistribution, RuleScores};
use tracing::debug;

pub const MODEL_WEIGHT: f64 = 0.8;
pub const RULE_WEIGHT: f64 = 0.2;

/// Interpolates model probabilities with positive rule scores, renormalizes,
/// and picks the most likely category.
///
/// Only categories present in `model` appear in the result. A distribution
/// summing to zero is left as it is. Ties go to the category declared first
/// in [`Category::ALL`].
pub fn blend(model: &CategoryDistribution, rule_scores: &RuleScores) -> BlendedPrediction {
    let mut probabilities: CategoryDistribution = model
        .iter()
        .map(|(category, p)| {
            let rule = rule_scores.get(category);
            let blended = if rule > 0.0 {
                MODEL_WEIGHT * p + RULE_WEIGHT * rule
            } else {
                p
            };
            (category, blended)
        })
        .collect();

    let total = probabilities.total();
    if total > 0.0 {
        for p in probabilities.values_mut() {
            *p /= total;
        }
    } else {
        debug!("model distribution sums to zero, skipping renormalization");
    }

    let (predicted_category, confidence) = argmax(&probabilities);
    BlendedPrediction {
        predicted_category,
        confidence,
        probabilities,
    }
}

/// Highest probability in canonical category order; the first maximum wins.
pub fn argmax(dist: &CategoryDistribution) -> (Category, f64) {
    let mut best: Option<(Category, f64)> = None;
    for category in Category::ALL {
        let Some(p) = dist.get(category) else {
            continue;
        };
        match best {
            Some((_, top)) if p <= top => {}
            _ => best = Some((category, p)),
        }
    }
    best.unwrap_or((Category::Other, 0.0))
}
