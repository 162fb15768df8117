//! ProviderStore port - stored vendor configurations.

use async_trait::async_trait;

use crate::domain::{NewProvider, ProviderConfig, ProviderId, StoreError};

/// # Design
/// - At most one provider has `is_default = true`. Inserting a default or
///   calling `set_default` clears the flag on every other provider in the
///   same write.
#[async_trait]
pub trait ProviderStore: Send + Sync {
    async fn insert_provider(&self, new: NewProvider) -> Result<ProviderConfig, StoreError>;

    async fn get_provider(&self, id: ProviderId) -> Result<Option<ProviderConfig>, StoreError>;

    /// Highest priority first, ties by id.
    async fn list_providers(&self, active_only: bool) -> Result<Vec<ProviderConfig>, StoreError>;

    async fn default_provider(&self) -> Result<Option<ProviderConfig>, StoreError>;

    async fn set_default(&self, id: ProviderId) -> Result<ProviderConfig, StoreError>;
}
