use labdoc_core::error::RuleError;
use labdoc_core::extractor::extract;
use labdoc_core::models::Category;
use labdoc_core::rules::{score, RuleSet};
use labdoc_core::{PatternCatalog, RuleScores};
use std::fs;

fn scores_for(rules: &RuleSet, text: &str) -> RuleScores {
    let catalog = PatternCatalog::standard().unwrap();
    score(rules, &extract(&catalog, text))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn report_scenario_leans_to_test_report() {
    let scores = scores_for(
        &RuleSet::standard(),
        "Informe LAB-2025-001 del 15/03/2025: presión 120 MPa, temperatura 23.5°C",
    );
    assert!(close(scores.get(Category::TestReport), 0.5 / 0.9));
    assert!(close(scores.get(Category::CalibrationCertificate), 0.1 / 0.9));
    assert!(close(scores.get(Category::Procedure), 0.0));
    assert!(close(scores.get(Category::Record), 0.3 / 0.9));
    assert!(scores.get(Category::TestReport) > scores.get(Category::Record));
    assert!(close(scores.total(), 1.0));
}

#[test]
fn no_facts_means_no_rule_signal() {
    let scores = scores_for(&RuleSet::standard(), "Texto sin ningún dato.");
    assert!(scores.is_zero());
    assert_eq!(scores, RuleScores::zero());
    for category in Category::SCORED {
        assert_eq!(scores.get(category), 0.0);
    }
}

#[test]
fn generic_numbers_alone_only_satisfy_the_temperature_bound() {
    let scores = scores_for(&RuleSet::standard(), "página 7 de 12");
    assert!(close(scores.get(Category::CalibrationCertificate), 1.0));
    assert!(close(scores.get(Category::TestReport), 0.0));
}

#[test]
fn certificate_text_spreads_over_three_categories() {
    let scores = scores_for(
        &RuleSet::standard(),
        "Certificado QA-2023-0456 conforme a ISO 9001-2015",
    );
    assert!(close(scores.get(Category::CalibrationCertificate), 0.5 / 0.9));
    assert!(close(scores.get(Category::Procedure), 0.3 / 0.9));
    assert!(close(scores.get(Category::Record), 0.1 / 0.9));
    assert!(close(scores.get(Category::TestReport), 0.0));
}

#[test]
fn many_temperatures_drop_the_certificate_rule() {
    let scores = scores_for(&RuleSet::standard(), "lecturas 10°C, 20°C y 30°C");
    assert!(close(scores.get(Category::TestReport), 1.0));
    assert!(close(scores.get(Category::CalibrationCertificate), 0.0));
}

#[test]
fn scores_sum_to_one_or_zero() {
    let rules = RuleSet::standard();
    for text in [
        "",
        "5 kg",
        "45 % y 60 %",
        "ISO 17025 con 12 MPa",
        "LAB-2024-001 2024-01-01 01/01/2024 ISO 9001 3 N 4 mm 5 g 6 %",
    ] {
        let scores = scores_for(&rules, text);
        let total = scores.total();
        assert!(total == 0.0 || close(total, 1.0), "{text:?} sums to {total}");
        assert!(scores.iter().all(|(c, v)| c.is_scored() && v >= 0.0));
    }
}

#[test]
fn rules_load_from_toml_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("01_many_temps.toml"),
        r#"
name = "many temperatures"
category = "informe_ensayo"
weight = 3.0

[condition]
type = "count_at_least"
fact = "temperatura"
min = 3
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("02_weighed.toml"),
        r#"
name = "weighed or loaded"
category = "registro"
weight = 1.0

[condition]
type = "any"

[[condition.any]]
type = "present"
fact = "masa"

[[condition.any]]
type = "present"
fact = "fuerza"
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("03_disabled.toml"),
        r#"
name = "disabled"
category = "procedimiento"
weight = 5.0
enabled = false

[condition]
type = "absent"
fact = "presion"
"#,
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not a rule").unwrap();

    let rules = RuleSet::load_from_dir(dir.path()).unwrap();
    let names: Vec<&str> = rules.rules().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["many temperatures", "weighed or loaded", "disabled"]);

    let scores = scores_for(&rules, "10°C 20°C 30°C y 5 kg");
    assert!(close(scores.get(Category::TestReport), 0.75));
    assert!(close(scores.get(Category::Record), 0.25));
    assert!(close(scores.get(Category::Procedure), 0.0));
}

#[test]
fn rule_targeting_an_unscored_category_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("offer.toml"),
        r#"
name = "priced"
category = "oferta"
weight = 1.0

[condition]
type = "present"
fact = "porcentaje"
"#,
    )
    .unwrap();
    let err = RuleSet::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        RuleError::UnscoredCategory {
            category: Category::Offer,
            ..
        }
    ));
}

#[test]
fn malformed_rule_file_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.toml"), "name = \"x\"\nweight = ").unwrap();
    match RuleSet::load_from_dir(dir.path()) {
        Err(RuleError::Parse { path, .. }) => assert!(path.ends_with("broken.toml")),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn negative_weights_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("neg.toml"),
        r#"
name = "negative"
category = "registro"
weight = -1.0

[condition]
type = "present"
fact = "masa"
"#,
    )
    .unwrap();
    assert!(matches!(
        RuleSet::load_from_dir(dir.path()),
        Err(RuleError::InvalidWeight { .. })
    ));
}
