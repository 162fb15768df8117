//! Domain model (IDs, task lifecycle, content, providers, errors).

pub mod article;
pub mod content;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod provider;
pub mod slug;
pub mod state;
pub mod task;

pub use article::{Article, DEFAULT_LANGUAGE, GenerationOptions};
pub use content::{CATEGORY_PALETTE, Category, NewCategory, NewPost, Post};
pub use errors::{OrchestratorError, ProviderError, StoreError};
pub use ids::{CategoryId, PostId, ProviderId, TaskId};
pub use outcome::{BatchOutcome, FetchOutcome, TaskResult};
pub use provider::{NewProvider, ProviderConfig, ProviderKind, ProviderSettings};
pub use slug::slugify;
pub use state::TaskStatus;
pub use task::{NewTask, TaskPayload, TaskRecord, TaskStatistics, TaskType, TransitionError};
