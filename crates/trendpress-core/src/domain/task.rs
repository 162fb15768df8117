//! Task record: type + payload + lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::ids::TaskId;
use super::outcome::TaskResult;
use super::state::TaskStatus;

/// What a task asks the pipeline to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    FetchTrends,
    GenerateArticle,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::FetchTrends => "fetch_trends",
            TaskType::GenerateArticle => "generate_article",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown task type `{0}`")]
pub struct UnknownTaskType(pub String);

impl FromStr for TaskType {
    type Err = UnknownTaskType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fetch_trends" => Ok(TaskType::FetchTrends),
            "generate_article" => Ok(TaskType::GenerateArticle),
            other => Err(UnknownTaskType(other.to_string())),
        }
    }
}

/// Schema-on-read task payload.
///
/// The shape is a contract with the trend source (title, topic, keywords,
/// description, source_url, language). Only the keys the pipeline reads are
/// looked at; everything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskPayload(Map<String, Value>);

impl TaskPayload {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Convenience constructor for a trend-shaped payload.
    pub fn trend(title: impl Into<String>, topic: impl Into<String>) -> Self {
        let mut payload = Self::new();
        payload.set("title", title.into());
        payload.set("topic", topic.into());
        payload
    }

    /// Accepts JSON objects only.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Non-blank string value for `key`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    pub fn topic(&self) -> Option<&str> {
        self.get_str("topic")
    }

    pub fn description(&self) -> Option<&str> {
        self.get_str("description")
    }

    pub fn source_url(&self) -> Option<&str> {
        self.get_str("source_url")
    }

    pub fn language(&self) -> Option<&str> {
        self.get_str("language")
    }

    /// Keywords as a list. A comma-separated string is accepted too.
    pub fn keywords(&self) -> Vec<String> {
        match self.0.get("keywords") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for TaskPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Data required to insert a new task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub task_type: TaskType,
    pub payload: TaskPayload,
    pub scheduled_at: DateTime<Utc>,
}

impl NewTask {
    pub fn generate_article(payload: TaskPayload, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            task_type: TaskType::GenerateArticle,
            payload,
            scheduled_at,
        }
    }
}

/// A transition was requested from the wrong source state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move task from {actual} (expected {expected})")]
pub struct TransitionError {
    pub expected: TaskStatus,
    pub actual: TaskStatus,
}

/// Persisted task.
///
/// Design:
/// - This is the single source of truth for a task's lifecycle.
/// - All status changes go through the transition methods below, which
///   check the source state and keep the timestamp/result/error invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub task_type: TaskType,
    pub payload: TaskPayload,
    pub status: TaskStatus,

    /// Populated only when completed.
    pub result: Option<TaskResult>,

    /// Populated only when failed.
    pub error_message: Option<String>,

    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn new(id: TaskId, new: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id,
            task_type: new.task_type,
            payload: new.payload,
            status: TaskStatus::Pending,
            result: None,
            error_message: None,
            scheduled_at: Some(new.scheduled_at),
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn ensure(&self, expected: TaskStatus) -> Result<(), TransitionError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(TransitionError {
                expected,
                actual: self.status,
            })
        }
    }

    /// `completed_at` never precedes `started_at`.
    fn finish_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.started_at {
            Some(started) if started > now => started,
            _ => now,
        }
    }

    /// Pending -> Running.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.ensure(TaskStatus::Pending)?;
        self.status = TaskStatus::Running;
        self.started_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Running -> Completed.
    pub fn complete(&mut self, result: TaskResult, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.ensure(TaskStatus::Running)?;
        self.status = TaskStatus::Completed;
        self.result = Some(result);
        self.error_message = None;
        self.completed_at = Some(self.finish_time(now));
        self.updated_at = now;
        Ok(())
    }

    /// Running -> Failed.
    pub fn fail(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.ensure(TaskStatus::Running)?;
        self.status = TaskStatus::Failed;
        self.result = None;
        self.error_message = Some(message.into());
        self.completed_at = Some(self.finish_time(now));
        self.updated_at = now;
        Ok(())
    }

    /// Failed -> Pending, clearing everything the failed attempt recorded.
    pub fn reset_for_retry(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.ensure(TaskStatus::Failed)?;
        self.status = TaskStatus::Pending;
        self.result = None;
        self.error_message = None;
        self.started_at = None;
        self.completed_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Title shown in logs and listings.
    pub fn display_title(&self) -> &str {
        self.payload.title().unwrap_or("(untitled)")
    }
}

/// Task counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatistics {
    pub total: u64,
    pub pending: u64,
    pub running: u64,
    pub completed: u64,
    pub failed: u64,
}

impl TaskStatistics {
    pub fn record(&mut self, status: TaskStatus, count: u64) {
        match status {
            TaskStatus::Pending => self.pending += count,
            TaskStatus::Running => self.running += count,
            TaskStatus::Completed => self.completed += count,
            TaskStatus::Failed => self.failed += count,
        }
        self.total += count;
    }

    pub fn get(&self, status: TaskStatus) -> u64 {
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::Running => self.running,
            TaskStatus::Completed => self.completed,
            TaskStatus::Failed => self.failed,
        }
    }
}
