//! Implementations of the ports.
//!
//! - Stores: `InMemoryStore` (tests, `--memory`) and `SqliteStore`.
//! - Vendors: `GeminiClient`, `OpenAiClient` (OpenAI / OpenRouter) and the
//!   offline `MockProvider`.

use std::time::Duration;

pub mod gemini;
pub mod memory;
pub mod mock;
pub mod openai;
pub mod prompts;
pub mod response;
pub mod sqlite;

pub use self::gemini::GeminiClient;
pub use self::memory::InMemoryStore;
pub use self::mock::MockProvider;
pub use self::openai::OpenAiClient;
pub use self::sqlite::SqliteStore;

/// Vendor request timeout for trend searches and key probes.
pub const TREND_TIMEOUT: Duration = Duration::from_secs(60);

/// Vendor request timeout for article generation.
pub const ARTICLE_TIMEOUT: Duration = Duration::from_secs(120);
