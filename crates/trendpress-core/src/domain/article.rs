//! Generated article and the per-call options that shape it.

use serde::{Deserialize, Serialize};

/// Language for a task whose payload carries none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Article returned by a content generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,

    /// HTML body.
    pub content: String,

    pub meta_description: String,
    pub featured_image_prompt: String,

    /// Minutes.
    #[serde(default)]
    pub estimated_reading_time: Option<u32>,
}

/// Options passed to every `generate_article` call.
///
/// Built per call from settings plus the task payload, so concurrent callers
/// never see each other's language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub language: String,
    pub min_words: u32,
    pub max_words: u32,
    pub include_code_examples: bool,
}

impl GenerationOptions {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn is_arabic(&self) -> bool {
        self.language.eq_ignore_ascii_case("ar")
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            min_words: 800,
            max_words: 1500,
            include_code_examples: true,
        }
    }
}
