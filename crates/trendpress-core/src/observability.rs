//! Logging setup and status views for the control surface.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::domain::TaskStatistics;

/// Install the global `tracing` subscriber. `RUST_LOG` wins; default `info`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Snapshot shown by `stats` and at the end of `run`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub tasks: TaskStatistics,
    pub posts: u64,
}

impl PipelineStatus {
    /// `(label, value)` rows in display order.
    pub fn rows(&self) -> [(&'static str, u64); 6] {
        [
            ("Total tasks", self.tasks.total),
            ("Pending", self.tasks.pending),
            ("Running", self.tasks.running),
            ("Completed", self.tasks.completed),
            ("Failed", self.tasks.failed),
            ("Total posts", self.posts),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;

    #[test]
    fn rows_follow_statistics() {
        let mut tasks = TaskStatistics::default();
        tasks.record(TaskStatus::Completed, 2);
        tasks.record(TaskStatus::Failed, 1);
        let status = PipelineStatus { tasks, posts: 2 };

        let rows = status.rows();
        assert_eq!(rows[0], ("Total tasks", 3));
        assert_eq!(rows[3], ("Completed", 2));
        assert_eq!(rows[5], ("Total posts", 2));
    }

    #[test]
    fn init_twice_is_harmless() {
        init_tracing();
        init_tracing();
    }
}
