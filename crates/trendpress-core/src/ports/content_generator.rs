//! ContentGenerator port.

use async_trait::async_trait;

use crate::domain::{Article, GenerationOptions, ProviderError, TaskPayload};

/// Writes an article for one trend.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate_article(
        &self,
        payload: &TaskPayload,
        options: &GenerationOptions,
    ) -> Result<Article, ProviderError>;

    /// Image generation is not wired to any vendor; returns `None`.
    async fn generate_featured_image(&self, _prompt: &str) -> Result<Option<String>, ProviderError> {
        Ok(None)
    }
}
