//! Provider abstractions for document category models.
//!
//! A model receives the normalized text, its token ids and the numeric feature
//! vector, and answers with a probability per category label. Labels stay plain
//! strings here; mapping them onto known categories is the caller's job.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub mod http;
pub mod noop;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not implemented")]
    NotImplemented,
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInput {
    pub text: String,
    pub token_ids: Vec<u32>,
    pub numerical_features: Vec<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelOutput {
    /// Label/probability pairs in the order the model reported them.
    pub probabilities: Vec<(String, f64)>,
}

#[async_trait::async_trait]
pub trait CategoryModel: Send + Sync {
    async fn predict(&self, input: &ModelInput) -> Result<ModelOutput, ProviderError>;
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    models: HashMap<String, Arc<dyn CategoryModel>>,
    pub preferred_model: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, name: &str, model: Arc<dyn CategoryModel>) -> Self {
        self.models.insert(name.to_string(), model);
        self
    }

    pub fn set_preferred_model(mut self, name: &str) -> Self {
        self.preferred_model = Some(name.to_string());
        self
    }

    pub fn model(&self, name: Option<&str>) -> Result<Arc<dyn CategoryModel>, ProviderError> {
        let key = name
            .map(str::to_string)
            .or_else(|| self.preferred_model.clone())
            .ok_or_else(|| ProviderError::UnknownProvider("no model provider configured".into()))?;
        self.models
            .get(&key)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownProvider(key))
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.keys().cloned().collect();
        names.sort();
        names
    }
}
