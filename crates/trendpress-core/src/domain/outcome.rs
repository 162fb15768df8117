//! Outcome model: what the pipeline reports back.
//!
//! `TaskResult` is persisted on a completed task; `FetchOutcome` and
//! `BatchOutcome` are returned to the control surface and never stored.

use serde::{Deserialize, Serialize};

use super::ids::{PostId, TaskId};

/// Result recorded on a completed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub post_id: PostId,
    pub post_title: String,
    pub post_slug: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image_prompt: Option<String>,

    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_reading_time: Option<u32>,
}

/// Tasks created by one trend fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub created: usize,
    pub task_ids: Vec<TaskId>,
}

/// Summary of one `process_pending_tasks` run.
///
/// `successful + failed == total`; `task_ids` lists every task attempted, in
/// processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub task_ids: Vec<TaskId>,
}

impl BatchOutcome {
    pub fn record(&mut self, task_id: TaskId, succeeded: bool) {
        self.total += 1;
        if succeeded {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
        self.task_ids.push(task_id);
    }
}
