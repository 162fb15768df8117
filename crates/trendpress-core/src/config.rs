//! Runtime configuration.
//!
//! `Settings::default()` holds the built-in values; `Settings::from_env()`
//! loads `.env` (if present) and overrides from the process environment.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::domain::GenerationOptions;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://trendpress.db?mode=rwc";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings for one vendor.
#[derive(Clone, PartialEq)]
pub struct VendorSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl VendorSettings {
    pub fn gemini() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash-exp".to_string(),
            temperature: 0.7,
            max_tokens: 8000,
        }
    }

    pub fn openai() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            temperature: 0.7,
            max_tokens: 4000,
        }
    }

    /// Non-blank API key.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

impl std::fmt::Debug for VendorSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorSettings")
            .field("api_key", &self.api_key().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendSettings {
    /// Trends requested per fetch when the caller gives no count.
    pub count: u32,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentSettings {
    pub min_words: u32,
    pub max_words: u32,
    pub include_code_examples: bool,
    pub language: String,
}

impl ContentSettings {
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            language: self.language.clone(),
            min_words: self.min_words,
            max_words: self.max_words,
            include_code_examples: self.include_code_examples,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitSettings {
    pub enabled: bool,
    /// Pause between tasks in a batch.
    pub delay: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub trends: TrendSettings,
    pub content: ContentSettings,
    pub rate_limit: RateLimitSettings,
    /// Declared for operators; retries are manual.
    pub max_retries: u32,
    pub gemini: VendorSettings,
    pub openai: VendorSettings,
    pub database_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            trends: TrendSettings {
                count: 5,
                topics: [
                    "Artificial Intelligence",
                    "Machine Learning",
                    "Software Development",
                    "Web Development",
                    "Cloud Computing",
                    "DevOps",
                    "Cybersecurity",
                ]
                .map(String::from)
                .to_vec(),
            },
            content: ContentSettings {
                min_words: 800,
                max_words: 1500,
                include_code_examples: true,
                language: "en".to_string(),
            },
            rate_limit: RateLimitSettings {
                enabled: true,
                delay: Duration::from_secs(2),
            },
            max_retries: 3,
            gemini: VendorSettings::gemini(),
            openai: VendorSettings::openai(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

fn parse<T>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value: raw,
    })
}

fn parse_bool(key: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "expected a boolean".to_string(),
        }),
    }
}

impl Settings {
    /// Load `.env`, then read overrides from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (environment, test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("GEMINI_API_KEY") {
            settings.gemini.api_key = Some(v);
        }
        if let Some(v) = get("GEMINI_BASE_URL") {
            settings.gemini.base_url = v;
        }
        if let Some(v) = get("GEMINI_MODEL") {
            settings.gemini.model = v;
        }
        if let Some(v) = get("GEMINI_TEMPERATURE") {
            settings.gemini.temperature = parse("GEMINI_TEMPERATURE", v)?;
        }
        if let Some(v) = get("GEMINI_MAX_TOKENS") {
            settings.gemini.max_tokens = parse("GEMINI_MAX_TOKENS", v)?;
        }

        if let Some(v) = get("OPENAI_API_KEY") {
            settings.openai.api_key = Some(v);
        }
        if let Some(v) = get("OPENAI_BASE_URL") {
            settings.openai.base_url = v;
        }
        if let Some(v) = get("OPENAI_MODEL") {
            settings.openai.model = v;
        }
        if let Some(v) = get("OPENAI_TEMPERATURE") {
            settings.openai.temperature = parse("OPENAI_TEMPERATURE", v)?;
        }
        if let Some(v) = get("OPENAI_MAX_TOKENS") {
            settings.openai.max_tokens = parse("OPENAI_MAX_TOKENS", v)?;
        }

        if let Some(v) = get("AI_TRENDS_COUNT") {
            settings.trends.count = parse("AI_TRENDS_COUNT", v)?;
        }
        if let Some(v) = get("AI_TRENDS_TOPICS") {
            settings.trends.topics = v
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(v) = get("AI_CONTENT_LANGUAGE") {
            settings.content.language = v.trim().to_string();
        }
        if let Some(v) = get("AI_MIN_WORDS") {
            settings.content.min_words = parse("AI_MIN_WORDS", v)?;
        }
        if let Some(v) = get("AI_MAX_WORDS") {
            settings.content.max_words = parse("AI_MAX_WORDS", v)?;
        }
        if let Some(v) = get("AI_INCLUDE_CODE") {
            settings.content.include_code_examples = parse_bool("AI_INCLUDE_CODE", v)?;
        }

        if let Some(v) = get("AI_RATE_LIMIT_ENABLED") {
            settings.rate_limit.enabled = parse_bool("AI_RATE_LIMIT_ENABLED", v)?;
        }
        if let Some(v) = get("AI_DELAY_SECONDS") {
            settings.rate_limit.delay = Duration::from_secs(parse("AI_DELAY_SECONDS", v)?);
        }
        if let Some(v) = get("AI_MAX_RETRIES") {
            settings.max_retries = parse("AI_MAX_RETRIES", v)?;
        }

        if let Some(v) = get("DATABASE_URL") {
            settings.database_url = v;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.trends.count == 0 {
            return Err(ConfigError::Invalid {
                key: "AI_TRENDS_COUNT",
                value: self.trends.count.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.content.min_words > self.content.max_words {
            return Err(ConfigError::Invalid {
                key: "AI_MIN_WORDS",
                value: self.content.min_words.to_string(),
                reason: format!("exceeds AI_MAX_WORDS ({})", self.content.max_words),
            });
        }
        Ok(())
    }
}
