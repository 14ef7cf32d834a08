use crate::blender;
use crate::config::AppConfig;
use crate::encoding;
use crate::error::ClassifyError;
use crate::models::{BlendedPrediction, CategoryDistribution, RuleScores};
use crate::preprocess::{PreprocessOptions, Preprocessed, Preprocessor};
use providers::http::{HttpModel, HttpModelConfig};
use providers::noop::NoopModel;
use providers::{ModelInput, ProviderRegistry};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ClassificationInput {
    pub text: String,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub prediction: BlendedPrediction,
    pub requires_review: bool,
    /// False when the prediction rests on rule scores alone.
    pub model_used: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_labels: Vec<String>,
    pub preprocessed: Preprocessed,
}

pub async fn classify(
    input: ClassificationInput,
    preprocessor: &Preprocessor,
    registry: &ProviderRegistry,
    config: &AppConfig,
) -> Result<Classification, ClassifyError> {
    let limit = config.preprocess.max_text_bytes;
    if input.text.len() > limit {
        return Err(ClassifyError::DocumentTooLarge {
            size: input.text.len(),
            limit,
        });
    }

    // The model always needs the numeric branch, whatever the config says.
    let options = PreprocessOptions {
        create_features: true,
        validate: config.preprocess.validate,
    };
    let preprocessed = preprocessor.preprocess(&input.text, options);
    let features = preprocessed
        .features
        .unwrap_or_else(|| preprocessor.features(&preprocessed.extracted));

    let model_input = ModelInput {
        text: preprocessed.normalized_text.clone(),
        token_ids: encoding::encode(
            &preprocessed.normalized_text,
            config.model.max_sequence_length,
            config.model.vocab_size,
        ),
        numerical_features: features.to_vec(),
    };

    let mut unknown_labels = Vec::new();
    let mut model_dist = None;
    match registry.model(input.provider.as_deref()) {
        Ok(model) => match model.predict(&model_input).await {
            Ok(output) => {
                let (dist, unknown) = CategoryDistribution::from_labels(output.probabilities);
                if !unknown.is_empty() {
                    warn!(labels = ?unknown, "model returned unknown categories");
                }
                unknown_labels = unknown;
                if dist.is_empty() {
                    warn!("model returned no known category");
                } else {
                    model_dist = Some(dist);
                }
            }
            Err(e) => warn!(error = %e, "model prediction failed, using rule scores"),
        },
        Err(e) => warn!(error = %e, "no model available, using rule scores"),
    }

    let model_used = model_dist.is_some();
    let dist = model_dist.unwrap_or_else(|| rule_fallback(&preprocessed.rule_scores));
    let prediction = blender::blend(&dist, &preprocessed.rule_scores);
    let requires_review =
        !model_used || prediction.confidence < config.classification.confidence_threshold;

    debug!(
        category = %prediction.predicted_category,
        confidence = prediction.confidence,
        requires_review,
        "document classified"
    );

    Ok(Classification {
        prediction,
        requires_review,
        model_used,
        unknown_labels,
        preprocessed,
    })
}

/// Rule scores stand in for the model; with no rule signal the result is empty
/// and blending falls back to `otro` with zero confidence.
fn rule_fallback(scores: &RuleScores) -> CategoryDistribution {
    if scores.is_zero() {
        CategoryDistribution::new()
    } else {
        CategoryDistribution::from(scores)
    }
}

pub fn build_registry(config: &AppConfig) -> ProviderRegistry {
    let mut reg = ProviderRegistry::new().with_model("noop", Arc::new(NoopModel));

    if let Some(url) = &config.model.url {
        let model = HttpModel::new(HttpModelConfig {
            base_url: url.clone(),
            api_key: std::env::var("LABDOC_MODEL_API_KEY").ok(),
        });
        reg = reg.with_model("http", Arc::new(model));
    }

    reg.set_preferred_model(&config.model.provider)
}
