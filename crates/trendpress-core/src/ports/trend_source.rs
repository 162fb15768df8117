//! TrendSource port.

use async_trait::async_trait;

use crate::domain::{ProviderError, TaskPayload};

/// Finds trending topics worth writing about.
///
/// Each candidate is a payload carrying at least `title`, `topic` and
/// `keywords`, plus optional `description` and `source_url`.
#[async_trait]
pub trait TrendSource: Send + Sync {
    /// Short vendor name for logs.
    fn name(&self) -> &'static str;

    async fn search_trends(&self, count: u32) -> Result<Vec<TaskPayload>, ProviderError>;

    /// Cheap credential probe. `false` when unconfigured or rejected.
    async fn validate_api_key(&self) -> bool;
}
