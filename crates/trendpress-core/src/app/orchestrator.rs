//! Orchestrator - trend fetch fan-out and per-task article generation.
//!
//! Flow of one task (`run_task`):
//! load -> must be pending -> claim (pending -> running) -> generate article
//! -> get/create category -> unique slug -> insert draft post
//! -> complete (running -> completed).
//!
//! Any error after the claim moves the task to `failed` with the error text.
//! Categories created before the failure are kept.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::categories::CategoryResolver;
use super::factory::ProviderFactory;
use crate::config::{ContentSettings, Settings};
use crate::domain::{
    BatchOutcome, DEFAULT_LANGUAGE, FetchOutcome, NewPost, NewTask, OrchestratorError,
    ProviderConfig, StoreError, TaskId, TaskPayload, TaskRecord, TaskResult, TaskStatistics, TaskStatus,
};
use crate::observability::PipelineStatus;
use crate::ports::{Clock, ContentGenerator, ContentStore, TaskFilter, TaskStore, TrendSource};

/// Attempts at inserting a post when a concurrent writer takes the slug.
const SLUG_ATTEMPTS: usize = 3;

/// Drives trends into tasks and tasks into draft posts.
///
/// # Design
/// - Tasks run one at a time; a batch never runs two tasks concurrently.
/// - The store's `claim` is the only guard against double processing.
/// - Per-task errors end as `failed` rows, never as batch errors.
pub struct Orchestrator {
    pub(super) tasks: Arc<dyn TaskStore>,
    pub(super) content: Arc<dyn ContentStore>,
    pub(super) trend_source: Box<dyn TrendSource>,
    pub(super) generator: Box<dyn ContentGenerator>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) settings: Settings,
    pub(super) categories: CategoryResolver,
    pub(super) factory: ProviderFactory,
}

impl Orchestrator {
    /// Settings in effect, including per-run overrides.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Per-run content overrides (word range, language, code examples).
    pub fn content_settings_mut(&mut self) -> &mut ContentSettings {
        &mut self.settings.content
    }

    /// Redirect both capabilities at a stored provider.
    pub fn set_provider(&mut self, config: &ProviderConfig) {
        self.trend_source = self.factory.trend_source(Some(config));
        self.generator = self.factory.content_generator(Some(config));
        info!(
            provider_id = %config.id,
            kind = %config.kind,
            model = %config.model,
            "provider switched"
        );
    }

    pub fn trend_source_name(&self) -> &'static str {
        self.trend_source.name()
    }

    pub fn generator_name(&self) -> &'static str {
        self.generator.name()
    }

    /// Probe the trend source's credentials before a fetch.
    pub async fn validate_api_key(&self) -> bool {
        self.trend_source.validate_api_key().await
    }

    /// Ask the trend source for up to `count` topics and store one pending
    /// `generate_article` task per titled candidate, stamped with `language`.
    #[instrument(skip(self), fields(source = self.trend_source.name()))]
    pub async fn fetch_trends(
        &self,
        count: Option<u32>,
        language: Option<&str>,
    ) -> Result<FetchOutcome, OrchestratorError> {
        let count = count.unwrap_or(self.settings.trends.count);
        if count == 0 {
            return Err(OrchestratorError::InvalidCount);
        }
        let language = language.unwrap_or(self.settings.content.language.as_str());

        let trends = self
            .trend_source
            .search_trends(count)
            .await
            .map_err(OrchestratorError::Fetch)?;
        info!(found = trends.len(), requested = count, "trends fetched");

        let mut outcome = FetchOutcome::default();
        for mut payload in trends.into_iter().take(count as usize) {
            if payload.title().is_none() {
                warn!("skipping trend without a title");
                continue;
            }
            payload.set("language", language);

            let task = self
                .tasks
                .insert_task(NewTask::generate_article(payload, self.clock.now()))
                .await?;
            info!(task_id = %task.id, title = task.display_title(), "task created");
            outcome.created += 1;
            outcome.task_ids.push(task.id);
        }
        Ok(outcome)
    }

    /// Store a task by hand (control surface). `title` is required.
    pub async fn create_task(&self, payload: TaskPayload) -> Result<TaskRecord, OrchestratorError> {
        if payload.title().is_none() {
            return Err(OrchestratorError::InvalidPayload("title"));
        }
        let mut payload = payload;
        if payload.language().is_none() {
            payload.set("language", self.settings.content.language.as_str());
        }
        let task = self
            .tasks
            .insert_task(NewTask::generate_article(payload, self.clock.now()))
            .await?;
        info!(task_id = %task.id, "task created manually");
        Ok(task)
    }

    /// Process one task. `true` only when it ended `completed`.
    ///
    /// Missing or non-pending tasks are logged and left untouched.
    pub async fn process_task(&self, task_id: TaskId) -> bool {
        match self.run_task(task_id).await {
            Ok(_) => true,
            Err(OrchestratorError::TaskFailed { task_id, message }) => {
                error!(task_id = %task_id, error = %message, "task failed");
                false
            }
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "task not processed");
                false
            }
        }
    }

    /// Process one task, reporting why it did not complete.
    #[instrument(skip(self), fields(task_id = %task_id))]
    pub async fn run_task(&self, task_id: TaskId) -> Result<TaskRecord, OrchestratorError> {
        let task = self
            .tasks
            .get_task(task_id)
            .await?
            .ok_or(OrchestratorError::TaskNotFound(task_id))?;
        if !task.status.is_runnable() {
            return Err(OrchestratorError::InvalidState {
                id: task_id,
                expected: TaskStatus::Pending,
                actual: task.status,
            });
        }

        let task = self
            .tasks
            .claim(task_id)
            .await
            .map_err(OrchestratorError::from_store)?;
        info!(title = task.display_title(), "processing task");

        match self.generate_post(&task).await {
            Ok(result) => {
                let post_id = result.post_id;
                // A store error here leaves the post in place and the task running.
                let task = self.tasks.complete(task_id, result).await?;
                info!(post_id = %post_id, "task completed");
                Ok(task)
            }
            Err(e) => {
                let message = e.to_string();
                self.tasks.fail(task_id, &message).await?;
                Err(OrchestratorError::TaskFailed { task_id, message })
            }
        }
    }

    async fn generate_post(&self, task: &TaskRecord) -> Result<TaskResult, OrchestratorError> {
        if task.payload.title().is_none() {
            return Err(OrchestratorError::InvalidPayload("title"));
        }
        // Fetch and create_task stamp the configured language; rows inserted
        // any other way fall back to English.
        let language = task.payload.language().unwrap_or(DEFAULT_LANGUAGE);
        let options = self
            .settings
            .content
            .generation_options()
            .with_language(language);

        let article = self
            .generator
            .generate_article(&task.payload, &options)
            .await?;

        let topic = task
            .payload
            .topic()
            .ok_or(OrchestratorError::InvalidPayload("topic"))?;
        let category = self.categories.get_or_create(topic).await?;

        let mut attempt = 0;
        let post = loop {
            attempt += 1;
            let slug = self.categories.unique_slug(&article.title).await?;
            let new = NewPost {
                title: article.title.clone(),
                slug,
                content: article.content.clone(),
                category_id: category.id,
                source_url: task.payload.source_url().map(String::from),
                meta_description: Some(article.meta_description.clone()),
            };
            match self.content.insert_post(new).await {
                Ok(post) => break post,
                Err(StoreError::Conflict(reason)) if attempt < SLUG_ATTEMPTS => {
                    warn!(%reason, attempt, "slug taken concurrently, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        };
        info!(post_id = %post.id, slug = %post.slug, category = %category.name, "draft post created");

        Ok(TaskResult {
            post_id: post.id,
            post_title: post.title,
            post_slug: post.slug,
            meta_description: Some(article.meta_description),
            featured_image_prompt: Some(article.featured_image_prompt),
            estimated_reading_time: article.estimated_reading_time,
        })
    }

    /// Process pending tasks oldest-scheduled first, one at a time.
    ///
    /// A failing task never stops the batch.
    #[instrument(skip(self))]
    pub async fn process_pending_tasks(
        &self,
        limit: Option<usize>,
    ) -> Result<BatchOutcome, OrchestratorError> {
        let pending = self.tasks.pending_tasks(limit).await?;
        info!(count = pending.len(), "processing pending tasks");

        let mut outcome = BatchOutcome::default();
        for (i, task) in pending.iter().enumerate() {
            if i > 0 && self.settings.rate_limit.enabled && !self.settings.rate_limit.delay.is_zero() {
                tokio::time::sleep(self.settings.rate_limit.delay).await;
            }
            let succeeded = self.process_task(task.id).await;
            outcome.record(task.id, succeeded);
        }

        info!(
            total = outcome.total,
            successful = outcome.successful,
            failed = outcome.failed,
            "batch finished"
        );
        Ok(outcome)
    }

    /// Reset a failed task to pending and process it again.
    ///
    /// `false` without any change when the task is missing or not failed.
    #[instrument(skip(self), fields(task_id = %task_id))]
    pub async fn retry_failed_task(&self, task_id: TaskId) -> bool {
        let task = match self.tasks.get_task(task_id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                warn!("retry requested for unknown task");
                return false;
            }
            Err(e) => {
                error!(error = %e, "could not load task for retry");
                return false;
            }
        };
        if task.status != TaskStatus::Failed {
            warn!(status = %task.status, "only failed tasks can be retried");
            return false;
        }
        if let Err(e) = self.tasks.reset_for_retry(task_id).await {
            warn!(error = %e, "retry reset rejected");
            return false;
        }
        info!("task reset to pending");
        self.process_task(task_id).await
    }

    /// Task counts by status.
    pub async fn statistics(&self) -> Result<TaskStatistics, OrchestratorError> {
        Ok(self.tasks.statistics().await?)
    }

    /// Posts in the content store, drafts included.
    pub async fn post_count(&self) -> Result<u64, OrchestratorError> {
        Ok(self.content.post_count().await?)
    }

    /// Task statistics plus post count, as shown by `stats` and `run`.
    pub async fn status(&self) -> Result<PipelineStatus, OrchestratorError> {
        Ok(PipelineStatus {
            tasks: self.statistics().await?,
            posts: self.post_count().await?,
        })
    }

    /// `None` when no task has this id.
    pub async fn get_task(&self, task_id: TaskId) -> Result<Option<TaskRecord>, OrchestratorError> {
        Ok(self.tasks.get_task(task_id).await?)
    }

    /// Tasks ordered by id, narrowed by `filter`.
    pub async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<TaskRecord>, OrchestratorError> {
        Ok(self.tasks.list_tasks(filter).await?)
    }

    /// Pass `prompt` to the content generator's image hook.
    pub async fn generate_featured_image(
        &self,
        prompt: &str,
    ) -> Result<Option<String>, OrchestratorError> {
        Ok(self.generator.generate_featured_image(prompt).await?)
    }
}
