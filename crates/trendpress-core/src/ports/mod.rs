//! Ports - the seams between the orchestrator and the outside world.
//!
//! Each trait hides one external system: the task database, the content
//! database, stored provider configuration, the AI vendor (split into a
//! trend source and a content generator) and the clock.

pub mod clock;
pub mod content_generator;
pub mod content_store;
pub mod provider_store;
pub mod task_store;
pub mod trend_source;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::content_generator::ContentGenerator;
pub use self::content_store::ContentStore;
pub use self::provider_store::ProviderStore;
pub use self::task_store::{TaskFilter, TaskStore};
pub use self::trend_source::TrendSource;
