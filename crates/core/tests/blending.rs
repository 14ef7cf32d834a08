use labdoc_core::blender::{blend, MODEL_WEIGHT, RULE_WEIGHT};
use labdoc_core::models::Category;
use labdoc_core::{CategoryDistribution, RuleScores};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn dist(pairs: &[(Category, f64)]) -> CategoryDistribution {
    pairs.iter().copied().collect()
}

#[test]
fn rule_signal_tilts_an_even_model() {
    let model = dist(&[(Category::TestReport, 0.5), (Category::Record, 0.5)]);
    let rules = RuleScores::normalized([(Category::TestReport, 1.0)]);

    let blended = blend(&model, &rules);
    assert_eq!(blended.predicted_category, Category::TestReport);
    assert!(close(blended.confidence, 0.6 / 1.1));
    assert!(close(
        blended.probabilities.get(Category::TestReport).unwrap(),
        0.6 / 1.1
    ));
    assert!(close(
        blended.probabilities.get(Category::Record).unwrap(),
        0.5 / 1.1
    ));
    assert!(close(blended.probabilities.total(), 1.0));
}

#[test]
fn weights_are_the_documented_split() {
    assert!(close(MODEL_WEIGHT + RULE_WEIGHT, 1.0));
    assert!(MODEL_WEIGHT > RULE_WEIGHT);
}

#[test]
fn zero_rule_scores_only_renormalize() {
    let model = dist(&[(Category::Procedure, 0.2), (Category::Protocol, 0.6)]);
    let blended = blend(&model, &RuleScores::zero());
    assert_eq!(blended.predicted_category, Category::Protocol);
    assert!(close(blended.confidence, 0.75));
    assert!(close(blended.probabilities.get(Category::Procedure).unwrap(), 0.25));
}

#[test]
fn categories_missing_from_the_model_are_not_added() {
    let model = dist(&[(Category::Offer, 1.0)]);
    let rules = RuleScores::normalized([(Category::Record, 2.0), (Category::TestReport, 1.0)]);
    let blended = blend(&model, &rules);
    assert_eq!(blended.probabilities.len(), 1);
    assert_eq!(blended.predicted_category, Category::Offer);
    assert!(close(blended.confidence, 1.0));
    assert!(blended.probabilities.get(Category::Record).is_none());
}

#[test]
fn full_distribution_stays_normalized() {
    let n = Category::ALL.len() as f64;
    let model: CategoryDistribution = Category::ALL.iter().map(|c| (*c, 1.0 / n)).collect();
    let rules = RuleScores::normalized([
        (Category::CalibrationCertificate, 0.5),
        (Category::Procedure, 0.3),
        (Category::Record, 0.2),
    ]);
    let blended = blend(&model, &rules);
    assert_eq!(blended.probabilities.len(), 9);
    assert!(close(blended.probabilities.total(), 1.0));
    assert_eq!(blended.predicted_category, Category::CalibrationCertificate);
    assert!(blended.probabilities.iter().all(|(_, p)| (0.0..=1.0).contains(&p)));
}

#[test]
fn ties_go_to_the_first_declared_category() {
    let model = dist(&[(Category::Other, 0.5), (Category::Contract, 0.5)]);
    let blended = blend(&model, &RuleScores::zero());
    assert_eq!(blended.predicted_category, Category::Contract);
    assert!(close(blended.confidence, 0.5));
}

#[test]
fn zero_sum_distributions_are_left_alone() {
    let model = dist(&[(Category::Record, 0.0), (Category::Other, 0.0)]);
    let blended = blend(&model, &RuleScores::zero());
    assert_eq!(blended.probabilities, model);
    assert_eq!(blended.predicted_category, Category::Record);
    assert_eq!(blended.confidence, 0.0);

    let empty = blend(&CategoryDistribution::new(), &RuleScores::zero());
    assert_eq!(empty.predicted_category, Category::Other);
    assert_eq!(empty.confidence, 0.0);
    assert!(empty.probabilities.is_empty());
}

#[test]
fn serializes_with_category_labels() {
    let model = dist(&[(Category::TestReport, 0.9), (Category::Record, 0.1)]);
    let json = serde_json::to_value(blend(&model, &RuleScores::zero())).unwrap();
    assert_eq!(json["predicted_category"], "informe_ensayo");
    assert!(json["probabilities"]["registro"].is_number());
}
