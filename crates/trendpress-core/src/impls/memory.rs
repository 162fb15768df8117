//! In-memory store implementation.
//!
//! Implements all three store ports behind one `tokio::sync::Mutex`, so every
//! operation (including "clear the other defaults") is a single critical
//! section. Used by tests and by the CLI's `--memory` mode.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Category, CategoryId, NewCategory, NewPost, NewProvider, NewTask, Post, PostId,
    ProviderConfig, ProviderId, StoreError, TaskId, TaskRecord, TaskResult, TaskStatistics,
    TaskStatus, TransitionError,
};
use crate::ports::{
    Clock, ContentStore, ProviderStore, SystemClock, TaskFilter, TaskStore,
};

/// In-memory store state.
#[derive(Default)]
struct MemoryState {
    tasks: BTreeMap<TaskId, TaskRecord>,
    posts: BTreeMap<PostId, Post>,
    categories: BTreeMap<CategoryId, Category>,
    providers: BTreeMap<ProviderId, ProviderConfig>,

    next_task_id: i64,
    next_post_id: i64,
    next_category_id: i64,
    next_provider_id: i64,
}

fn allocate(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl MemoryState {
    fn task_mut(&mut self, id: TaskId) -> Result<&mut TaskRecord, StoreError> {
        self.tasks.get_mut(&id).ok_or(StoreError::NotFound {
            entity: "task",
            id: id.get(),
        })
    }
}

fn invalid(id: TaskId, err: TransitionError) -> StoreError {
    StoreError::InvalidState {
        id,
        expected: err.expected,
        actual: err.actual,
    }
}

pub struct InMemoryStore {
    state: Mutex<MemoryState>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            clock,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn insert_task(&self, new: NewTask) -> Result<TaskRecord, StoreError> {
        let mut state = self.state.lock().await;
        let id = TaskId::new(allocate(&mut state.next_task_id));
        let record = TaskRecord::new(id, new, self.clock.now());
        state.tasks.insert(id, record.clone());
        Ok(record)
    }

    async fn get_task(&self, id: TaskId) -> Result<Option<TaskRecord>, StoreError> {
        Ok(self.state.lock().await.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<TaskRecord>, StoreError> {
        let state = self.state.lock().await;
        let matching = state
            .tasks
            .values()
            .filter(|t| filter.status.is_none_or(|s| t.status == s))
            .cloned();
        Ok(match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn pending_tasks(&self, limit: Option<usize>) -> Result<Vec<TaskRecord>, StoreError> {
        let state = self.state.lock().await;
        let mut pending: Vec<TaskRecord> = state
            .tasks
            .values()
            .filter(|t| t.status == TaskStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| (a.scheduled_at, a.id).cmp(&(b.scheduled_at, b.id)));
        if let Some(limit) = limit {
            pending.truncate(limit);
        }
        Ok(pending)
    }

    async fn claim(&self, id: TaskId) -> Result<TaskRecord, StoreError> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let task = state.task_mut(id)?;
        task.start(now).map_err(|e| invalid(id, e))?;
        Ok(task.clone())
    }

    async fn complete(&self, id: TaskId, result: TaskResult) -> Result<TaskRecord, StoreError> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let task = state.task_mut(id)?;
        task.complete(result, now).map_err(|e| invalid(id, e))?;
        Ok(task.clone())
    }

    async fn fail(&self, id: TaskId, message: &str) -> Result<TaskRecord, StoreError> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let task = state.task_mut(id)?;
        task.fail(message, now).map_err(|e| invalid(id, e))?;
        Ok(task.clone())
    }

    async fn reset_for_retry(&self, id: TaskId) -> Result<TaskRecord, StoreError> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let task = state.task_mut(id)?;
        task.reset_for_retry(now).map_err(|e| invalid(id, e))?;
        Ok(task.clone())
    }

    async fn statistics(&self) -> Result<TaskStatistics, StoreError> {
        let state = self.state.lock().await;
        let mut stats = TaskStatistics::default();
        for task in state.tasks.values() {
            stats.record(task.status, 1);
        }
        Ok(stats)
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.categories.values().find(|c| c.name == name).cloned())
    }

    async fn insert_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        let mut state = self.state.lock().await;
        if state.categories.values().any(|c| c.name == new.name) {
            return Err(StoreError::Conflict(format!(
                "category `{}` already exists",
                new.name
            )));
        }
        let id = CategoryId::new(allocate(&mut state.next_category_id));
        let category = Category::new(id, new, self.clock.now());
        state.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.state.lock().await.categories.values().cloned().collect())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        let state = self.state.lock().await;
        Ok(state.posts.values().any(|p| p.slug == slug))
    }

    async fn insert_post(&self, new: NewPost) -> Result<Post, StoreError> {
        let mut state = self.state.lock().await;
        if state.posts.values().any(|p| p.slug == new.slug) {
            return Err(StoreError::Conflict(format!(
                "post slug `{}` already exists",
                new.slug
            )));
        }
        if !state.categories.contains_key(&new.category_id) {
            return Err(StoreError::NotFound {
                entity: "category",
                id: new.category_id.get(),
            });
        }
        let id = PostId::new(allocate(&mut state.next_post_id));
        let post = Post::draft(id, new, self.clock.now());
        state.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        Ok(self.state.lock().await.posts.get(&id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.posts.values().rev().cloned().collect())
    }

    async fn post_count(&self) -> Result<u64, StoreError> {
        Ok(self.state.lock().await.posts.len() as u64)
    }
}

#[async_trait]
impl ProviderStore for InMemoryStore {
    async fn insert_provider(&self, new: NewProvider) -> Result<ProviderConfig, StoreError> {
        let mut state = self.state.lock().await;
        if new.is_default {
            for provider in state.providers.values_mut() {
                provider.is_default = false;
            }
        }
        let id = ProviderId::new(allocate(&mut state.next_provider_id));
        let provider = ProviderConfig::new(id, new, self.clock.now());
        state.providers.insert(id, provider.clone());
        Ok(provider)
    }

    async fn get_provider(&self, id: ProviderId) -> Result<Option<ProviderConfig>, StoreError> {
        Ok(self.state.lock().await.providers.get(&id).cloned())
    }

    async fn list_providers(&self, active_only: bool) -> Result<Vec<ProviderConfig>, StoreError> {
        let state = self.state.lock().await;
        let mut providers: Vec<ProviderConfig> = state
            .providers
            .values()
            .filter(|p| !active_only || p.is_active)
            .cloned()
            .collect();
        providers.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
        Ok(providers)
    }

    async fn default_provider(&self) -> Result<Option<ProviderConfig>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.providers.values().find(|p| p.is_default).cloned())
    }

    async fn set_default(&self, id: ProviderId) -> Result<ProviderConfig, StoreError> {
        let mut state = self.state.lock().await;
        if !state.providers.contains_key(&id) {
            return Err(StoreError::NotFound {
                entity: "provider",
                id: id.get(),
            });
        }
        for provider in state.providers.values_mut() {
            provider.is_default = provider.id == id;
        }
        state.providers.get(&id).cloned().ok_or(StoreError::NotFound {
            entity: "provider",
            id: id.get(),
        })
    }
}
