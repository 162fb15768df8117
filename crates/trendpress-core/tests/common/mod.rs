// Shared fixtures for the orchestrator integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use trendpress_core::config::Settings;
use tokio::time::Instant;
use trendpress_core::domain::{
    Article, Category, GenerationOptions, NewCategory, NewPost, Post, PostId, ProviderError,
    StoreError, TaskPayload,
};
use trendpress_core::impls::InMemoryStore;
use trendpress_core::ports::{ContentGenerator, ContentStore, FixedClock, TrendSource};
use trendpress_core::{Orchestrator, OrchestratorBuilder};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap()
}

/// Defaults with the inter-task delay off.
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.rate_limit.enabled = false;
    settings
}

pub fn trend(title: &str, topic: &str) -> TaskPayload {
    TaskPayload::trend(title, topic)
        .with("keywords", json!(["ai", "trends"]))
        .with("description", format!("About {title}"))
        .with("source_url", format!("https://news.example.com/{}", title.len()))
}

/// Returns a fixed list, or a fixed error.
pub struct ScriptedTrendSource {
    trends: Vec<TaskPayload>,
    fail: bool,
}

impl ScriptedTrendSource {
    pub fn new(trends: Vec<TaskPayload>) -> Self {
        Self {
            trends,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            trends: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl TrendSource for ScriptedTrendSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn search_trends(&self, _count: u32) -> Result<Vec<TaskPayload>, ProviderError> {
        if self.fail {
            return Err(ProviderError::Status {
                provider: "scripted",
                status: 503,
                body: "unavailable".into(),
            });
        }
        // Deliberately ignores `count` so callers must truncate.
        Ok(self.trends.clone())
    }

    async fn validate_api_key(&self) -> bool {
        !self.fail
    }
}

/// Echoes the payload title, failing for titles in `failing`.
///
/// `calls` records `(title, language)` for every request, `called_at` the
/// tokio instant of each request.
#[derive(Clone, Default)]
pub struct ScriptedGenerator {
    pub failing: Arc<Mutex<HashSet<String>>>,
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
    pub called_at: Arc<Mutex<Vec<Instant>>>,
    pub fixed_title: Option<String>,
}

impl ScriptedGenerator {
    pub fn failing_on(titles: &[&str]) -> Self {
        let generator = Self::default();
        generator
            .failing
            .lock()
            .unwrap()
            .extend(titles.iter().map(|t| t.to_string()));
        generator
    }

    pub fn always_titled(title: &str) -> Self {
        Self {
            fixed_title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn heal(&self, title: &str) {
        self.failing.lock().unwrap().remove(title);
    }

    pub fn languages(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, l)| l.clone()).collect()
    }

    pub fn call_instants(&self) -> Vec<Instant> {
        self.called_at.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate_article(
        &self,
        payload: &TaskPayload,
        options: &GenerationOptions,
    ) -> Result<Article, ProviderError> {
        let title = payload.title().unwrap_or_default().to_string();
        self.called_at.lock().unwrap().push(Instant::now());
        self.calls
            .lock()
            .unwrap()
            .push((title.clone(), options.language.clone()));

        if self.failing.lock().unwrap().contains(&title) {
            return Err(ProviderError::response("scripted", format!("refused `{title}`")));
        }

        let title = self.fixed_title.clone().unwrap_or(title);
        Ok(Article {
            content: format!("<h2>{title}</h2><p>Body.</p>"),
            meta_description: format!("Meta for {title}"),
            featured_image_prompt: format!("Image of {title}"),
            estimated_reading_time: Some(5),
            title,
        })
    }
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<FixedClock>,
    pub orchestrator: Orchestrator,
}

pub fn harness(trends: Vec<TaskPayload>, generator: ScriptedGenerator) -> Harness {
    harness_with(test_settings(), trends, generator)
}

pub fn harness_with(
    settings: Settings,
    trends: Vec<TaskPayload>,
    generator: ScriptedGenerator,
) -> Harness {
    let clock = Arc::new(FixedClock::new(t0()));
    let store = Arc::new(InMemoryStore::with_clock(clock.clone()));
    let orchestrator = OrchestratorBuilder::new(settings)
        .store(store.clone())
        .trend_source(Box::new(ScriptedTrendSource::new(trends)))
        .content_generator(Box::new(generator))
        .clock(clock.clone())
        .build()
        .unwrap();
    Harness {
        store,
        clock,
        orchestrator,
    }
}

/// Content store over an `InMemoryStore` whose `insert_post` can be told to
/// report slug conflicts a number of times, or to always fail.
pub struct FlakyContentStore {
    pub inner: Arc<InMemoryStore>,
    conflicts_left: AtomicUsize,
    broken: bool,
    insert_attempts: AtomicUsize,
}

impl FlakyContentStore {
    pub fn conflicting(inner: Arc<InMemoryStore>, times: usize) -> Self {
        Self {
            inner,
            conflicts_left: AtomicUsize::new(times),
            broken: false,
            insert_attempts: AtomicUsize::new(0),
        }
    }

    pub fn broken(inner: Arc<InMemoryStore>) -> Self {
        Self {
            broken: true,
            ..Self::conflicting(inner, 0)
        }
    }

    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for FlakyContentStore {
    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        self.inner.find_category_by_name(name).await
    }

    async fn insert_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        self.inner.insert_category(new).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.inner.list_categories().await
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        self.inner.slug_exists(slug).await
    }

    async fn insert_post(&self, new: NewPost) -> Result<Post, StoreError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(StoreError::Corrupt("disk full".into()));
        }
        let conflict = self
            .conflicts_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if conflict {
            return Err(StoreError::Conflict(format!(
                "post slug `{}` already exists",
                new.slug
            )));
        }
        self.inner.insert_post(new).await
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        self.inner.get_post(id).await
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        self.inner.list_posts().await
    }

    async fn post_count(&self) -> Result<u64, StoreError> {
        self.inner.post_count().await
    }
}

/// Orchestrator whose tasks live in `store` and whose content goes through
/// `content`.
pub fn orchestrator_over(
    store: Arc<InMemoryStore>,
    content: Arc<FlakyContentStore>,
    generator: ScriptedGenerator,
) -> Orchestrator {
    OrchestratorBuilder::new(test_settings())
        .task_store(store)
        .content_store(content)
        .trend_source(Box::new(ScriptedTrendSource::new(Vec::new())))
        .content_generator(Box::new(generator))
        .build()
        .unwrap()
}
