//! OrchestratorBuilder - wiring of stores, vendors, clock and settings.
//!
//! Fail-fast: `build()` reports every missing store at once instead of
//! failing on first use.

use std::sync::Arc;

use super::categories::CategoryResolver;
use super::factory::ProviderFactory;
use super::orchestrator::Orchestrator;
use crate::config::Settings;
use crate::domain::ProviderConfig;
use crate::ports::{Clock, ContentGenerator, ContentStore, SystemClock, TaskStore, TrendSource};

/// # Example
/// ```ignore
/// let store = Arc::new(SqliteStore::connect(&settings.database_url).await?);
/// let orchestrator = OrchestratorBuilder::new(settings)
///     .store(store)
///     .provider(default_provider.as_ref())
///     .build()?;
/// ```
///
/// Vendors default to the environment's Gemini settings when neither
/// `provider()` nor explicit capabilities are given.
pub struct OrchestratorBuilder {
    settings: Settings,
    tasks: Option<Arc<dyn TaskStore>>,
    content: Option<Arc<dyn ContentStore>>,
    trend_source: Option<Box<dyn TrendSource>>,
    generator: Option<Box<dyn ContentGenerator>>,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing components: {0:?}")]
    Missing(Vec<&'static str>),
}

impl OrchestratorBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            tasks: None,
            content: None,
            trend_source: None,
            generator: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use one store for both tasks and content.
    pub fn store<S>(self, store: Arc<S>) -> Self
    where
        S: TaskStore + ContentStore + 'static,
    {
        self.task_store(store.clone()).content_store(store)
    }

    pub fn task_store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.tasks = Some(store);
        self
    }

    pub fn content_store(mut self, store: Arc<dyn ContentStore>) -> Self {
        self.content = Some(store);
        self
    }

    pub fn trend_source(mut self, source: Box<dyn TrendSource>) -> Self {
        self.trend_source = Some(source);
        self
    }

    pub fn content_generator(mut self, generator: Box<dyn ContentGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Both capabilities from a stored provider (`None`: environment Gemini).
    pub fn provider(mut self, config: Option<&ProviderConfig>) -> Self {
        let factory = ProviderFactory::new(self.settings.clone());
        self.trend_source = Some(factory.trend_source(config));
        self.generator = Some(factory.content_generator(config));
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<Orchestrator, BuildError> {
        let mut missing = Vec::new();
        if self.tasks.is_none() {
            missing.push("task_store");
        }
        if self.content.is_none() {
            missing.push("content_store");
        }
        let (Some(tasks), Some(content)) = (self.tasks, self.content) else {
            return Err(BuildError::Missing(missing));
        };

        let factory = ProviderFactory::new(self.settings.clone());
        let trend_source = self
            .trend_source
            .unwrap_or_else(|| factory.trend_source(None));
        let generator = self
            .generator
            .unwrap_or_else(|| factory.content_generator(None));

        Ok(Orchestrator {
            categories: CategoryResolver::new(content.clone()),
            tasks,
            content,
            trend_source,
            generator,
            clock: self.clock,
            settings: self.settings,
            factory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewProvider, ProviderId, ProviderKind};
    use crate::impls::InMemoryStore;
    use chrono::Utc;

    #[test]
    fn build_success() {
        let orchestrator = OrchestratorBuilder::new(Settings::default())
            .store(Arc::new(InMemoryStore::new()))
            .build();
        assert!(orchestrator.is_ok());
    }

    #[test]
    fn build_reports_all_missing_stores() {
        let result = OrchestratorBuilder::new(Settings::default()).build();
        assert!(matches!(
            result,
            Err(BuildError::Missing(missing)) if missing == vec!["task_store", "content_store"]
        ));
    }

    #[test]
    fn vendors_default_to_environment_gemini() {
        let orchestrator = OrchestratorBuilder::new(Settings::default())
            .store(Arc::new(InMemoryStore::new()))
            .build()
            .unwrap();
        assert_eq!(orchestrator.trend_source_name(), "gemini");
        assert_eq!(orchestrator.generator_name(), "gemini");
    }

    #[test]
    fn provider_selects_vendor_and_can_be_swapped() {
        let mock = ProviderConfig::new(
            ProviderId::new(1),
            NewProvider::new("offline", ProviderKind::Mock, "", "mock"),
            Utc::now(),
        );
        let router = ProviderConfig::new(
            ProviderId::new(2),
            NewProvider::new("router", ProviderKind::OpenRouter, "k", "meta/llama"),
            Utc::now(),
        );

        let mut orchestrator = OrchestratorBuilder::new(Settings::default())
            .store(Arc::new(InMemoryStore::new()))
            .provider(Some(&mock))
            .build()
            .unwrap();
        assert_eq!(orchestrator.generator_name(), "mock");

        orchestrator.set_provider(&router);
        assert_eq!(orchestrator.trend_source_name(), "openrouter");
        assert_eq!(orchestrator.generator_name(), "openrouter");
    }
}
