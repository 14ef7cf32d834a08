use crate::{CategoryModel, ModelInput, ModelOutput, ProviderError};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct HttpModelConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Remote inference service speaking `POST {base_url}/predict`.
#[derive(Clone)]
pub struct HttpModel {
    client: Client,
    cfg: Arc<HttpModelConfig>,
}

impl HttpModel {
    pub fn new(cfg: HttpModelConfig) -> Self {
        Self {
            client: Client::new(),
            cfg: Arc::new(cfg),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/predict", self.cfg.base_url.trim_end_matches('/'))
    }
}

#[derive(Deserialize)]
struct PredictApiResponse {
    probabilities: HashMap<String, f64>,
}

#[async_trait::async_trait]
impl CategoryModel for HttpModel {
    async fn predict(&self, input: &ModelInput) -> Result<ModelOutput, ProviderError> {
        let mut req = self.client.post(self.endpoint()).json(input);
        if let Some(key) = &self.cfg.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let parsed: PredictApiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let mut probabilities: Vec<(String, f64)> = parsed.probabilities.into_iter().collect();
        probabilities.sort_by(|a, b| a.0.cmp(&b.0));
        debug!(labels = probabilities.len(), "remote model answered");

        Ok(ModelOutput { probabilities })
    }
}
