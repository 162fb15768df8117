//! App - the orchestration layer.
//!
//! Combines the ports into the pipeline:
//! - **Orchestrator**: fetch trends, process tasks, retry, statistics
//! - **OrchestratorBuilder**: wiring and start-up validation
//! - **ProviderFactory**: stored provider -> vendor clients
//! - **CategoryResolver**: category find-or-create, unique slugs

pub mod builder;
pub mod categories;
pub mod factory;
pub mod orchestrator;

pub use self::builder::{BuildError, OrchestratorBuilder};
pub use self::categories::CategoryResolver;
pub use self::factory::ProviderFactory;
pub use self::orchestrator::Orchestrator;
