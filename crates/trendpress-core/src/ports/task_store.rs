//! TaskStore port - the source of truth for task records.

use async_trait::async_trait;

use crate::domain::{
    NewTask, StoreError, TaskId, TaskRecord, TaskResult, TaskStatistics, TaskStatus,
};

/// Listing filter for the control surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub limit: Option<usize>,
}

impl TaskFilter {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            limit: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Durable task records with a status lifecycle.
///
/// # Design
/// - Every transition is a conditional update on the current status; a
///   transition from the wrong state returns `StoreError::InvalidState` and
///   changes nothing.
/// - `claim` is the per-task guard: of two concurrent claims on the same
///   pending task, exactly one succeeds.
/// - Bookkeeping timestamps come from the store's clock.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, new: NewTask) -> Result<TaskRecord, StoreError>;

    async fn get_task(&self, id: TaskId) -> Result<Option<TaskRecord>, StoreError>;

    /// Ordered by id.
    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<TaskRecord>, StoreError>;

    /// Pending tasks, `scheduled_at` ascending, ties by id.
    async fn pending_tasks(&self, limit: Option<usize>) -> Result<Vec<TaskRecord>, StoreError>;

    /// Pending -> Running, stamping `started_at`.
    async fn claim(&self, id: TaskId) -> Result<TaskRecord, StoreError>;

    /// Running -> Completed with `result`.
    async fn complete(&self, id: TaskId, result: TaskResult) -> Result<TaskRecord, StoreError>;

    /// Running -> Failed with `message`.
    async fn fail(&self, id: TaskId, message: &str) -> Result<TaskRecord, StoreError>;

    /// Failed -> Pending, clearing the failed attempt.
    async fn reset_for_retry(&self, id: TaskId) -> Result<TaskRecord, StoreError>;

    async fn statistics(&self) -> Result<TaskStatistics, StoreError>;
}
