//! Error types, one enum per layer.
//!
//! - `ProviderError`: a vendor call failed (transport, HTTP status, shape).
//! - `StoreError`: persistence failed or refused a transition.
//! - `OrchestratorError`: what the orchestrator reports to its caller.

use thiserror::Error;

use super::ids::TaskId;
use super::state::TaskStatus;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} API key not configured")]
    NotConfigured { provider: &'static str },

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("invalid {provider} response: {reason}")]
    Response {
        provider: &'static str,
        reason: String,
    },

    #[error("missing required field `{0}`")]
    MissingField(String),
}

impl ProviderError {
    pub fn response(provider: &'static str, reason: impl Into<String>) -> Self {
        ProviderError::Response {
            provider,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{id} is {actual}, expected {expected}")]
    InvalidState {
        id: TaskId,
        expected: TaskStatus,
        actual: TaskStatus,
    },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("{0} not found")]
    TaskNotFound(TaskId),

    #[error("{id} is {actual}, expected {expected}")]
    InvalidState {
        id: TaskId,
        expected: TaskStatus,
        actual: TaskStatus,
    },

    #[error("task payload has no usable `{0}`")]
    InvalidPayload(&'static str),

    #[error("trend count must be at least 1")]
    InvalidCount,

    #[error("trend fetch failed: {0}")]
    Fetch(#[source] ProviderError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The task was moved to `failed`; `message` is what was recorded.
    #[error("{task_id} failed: {message}")]
    TaskFailed { task_id: TaskId, message: String },
}

impl OrchestratorError {
    /// Lift store-level "not found"/"wrong state" into task-level variants.
    pub fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity: "task", id } => {
                OrchestratorError::TaskNotFound(TaskId::new(id))
            }
            StoreError::InvalidState {
                id,
                expected,
                actual,
            } => OrchestratorError::InvalidState {
                id,
                expected,
                actual,
            },
            other => OrchestratorError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_lifts_to_task_not_found() {
        let err = OrchestratorError::from_store(StoreError::NotFound {
            entity: "task",
            id: 3,
        });
        assert!(matches!(err, OrchestratorError::TaskNotFound(id) if id == TaskId::new(3)));
    }

    #[test]
    fn other_store_errors_stay_wrapped() {
        let err = OrchestratorError::from_store(StoreError::Conflict("slug taken".into()));
        assert!(matches!(err, OrchestratorError::Store(StoreError::Conflict(_))));
    }

    #[test]
    fn messages_name_the_provider() {
        let err = ProviderError::Status {
            provider: "gemini",
            status: 429,
            body: "quota".into(),
        };
        assert_eq!(err.to_string(), "gemini returned HTTP 429: quota");
    }
}
