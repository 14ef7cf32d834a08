use cli::{build_preprocessor, input, parse_probabilities, report};
use labdoc_core::blender;
use labdoc_core::config::{AppConfig, RuleConfig};
use labdoc_core::models::Category;
use labdoc_core::PreprocessOptions;
use std::fs;
use tempfile::tempdir;

const REPORT: &str = "Informe LAB-2025-001 del 15/03/2025: presión 120 MPa, temperatura 23.5°C";

#[test]
fn document_on_disk_goes_through_every_stage() {
    let temp = tempdir().unwrap();
    let doc = temp.path().join("informe.txt");
    fs::write(&doc, REPORT).unwrap();

    let cfg = AppConfig::default();
    let pre = build_preprocessor(&cfg).unwrap();
    let text = input::read_document(doc.to_str().unwrap(), cfg.preprocess.max_text_bytes).unwrap();
    let result = pre.preprocess(&text, PreprocessOptions::from(&cfg.preprocess));

    assert_eq!(
        result.normalized_text,
        "informe <codigo_doc> del <fecha>: presión <presion>, temperatura <temp>"
    );
    let summary = report::extraction(&result.extracted);
    assert!(summary.contains("presion (1)"));
    assert!(summary.contains("120 MPa"));
    assert_eq!(
        report::validation(result.validation.as_ref().unwrap()),
        "valid: 2, warnings: 0, errors: 0"
    );
}

#[test]
fn rule_directory_from_config_replaces_built_in_rules() {
    let temp = tempdir().unwrap();
    let rules_dir = temp.path().join("rules");
    fs::create_dir_all(&rules_dir).unwrap();
    fs::write(
        rules_dir.join("dated.toml"),
        r#"
        name = "Dated documents are procedures"
        category = "procedimiento"
        weight = 1.0

        [condition]
        type = "present"
        fact = "fecha_ddmmyyyy"
    "#,
    )
    .unwrap();

    let cfg = AppConfig {
        rules: RuleConfig {
            path: Some(rules_dir.to_string_lossy().into_owned()),
        },
        ..AppConfig::default()
    };
    let pre = build_preprocessor(&cfg).unwrap();
    assert_eq!(pre.rules().rules().len(), 1);

    let scores = pre.score(&pre.extract(REPORT));
    assert_eq!(scores.get(Category::Procedure), 1.0);
    assert_eq!(report::scores(&scores).lines().count(), 4);
}

#[test]
fn broken_rule_directory_is_reported() {
    let cfg = AppConfig {
        rules: RuleConfig {
            path: Some("/nonexistent/labdoc-rules".to_string()),
        },
        ..AppConfig::default()
    };
    let err = build_preprocessor(&cfg).unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/labdoc-rules"));
}

#[test]
fn blend_command_inputs() {
    let model = parse_probabilities(r#"{"informe_ensayo": 0.5, "registro": 0.5, "factura": 0.2}"#)
        .unwrap();
    assert_eq!(model.len(), 2);

    let pre = build_preprocessor(&AppConfig::default()).unwrap();
    let prediction = blender::blend(&model, &pre.score(&pre.extract(REPORT)));
    assert_eq!(prediction.predicted_category, Category::TestReport);
    assert!(report::prediction(&prediction).starts_with("informe_ensayo"));

    assert!(parse_probabilities("[0.5, 0.5]").is_err());
    assert!(parse_probabilities(r#"{"registro": "alta"}"#).is_err());
}

#[test]
fn probabilities_naming_a_category_twice_are_rejected() {
    let err = parse_probabilities(r#"{"registro": 0.2, "Registro": 0.7}"#).unwrap_err();
    assert!(err.to_string().contains("registro"));
    assert!(parse_probabilities(r#"{" informe_ensayo": 0.4, "informe_ensayo": 0.6}"#).is_err());

    let dist = parse_probabilities(r#"{"Registro": 0.7, "otro": 0.3}"#).unwrap();
    assert_eq!(dist.get(Category::Record), Some(0.7));
    assert_eq!(dist.get(Category::Other), Some(0.3));
}
