use crate::{CategoryModel, ModelInput, ModelOutput, ProviderError};

/// Model placeholder used when no inference service is configured.
#[derive(Debug, Default)]
pub struct NoopModel;

#[async_trait::async_trait]
impl CategoryModel for NoopModel {
    async fn predict(&self, _input: &ModelInput) -> Result<ModelOutput, ProviderError> {
        Err(ProviderError::NotImplemented)
    }
}
