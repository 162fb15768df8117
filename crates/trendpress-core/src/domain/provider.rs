//! Stored AI provider configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::ProviderId;

/// Vendor family. Selects the client the factory builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "openrouter")]
    OpenRouter,
    Mock,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Mock => "mock",
        }
    }

    /// Unknown kinds resolve to Gemini.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(ProviderKind::Gemini)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown provider kind `{0}`")]
pub struct UnknownProviderKind(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProviderKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(UnknownProviderKind(other.to_string())),
        }
    }
}

/// Sampling settings stored with a provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 8000,
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub name: String,
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub settings: ProviderSettings,
    pub is_active: bool,
    pub is_default: bool,
    pub priority: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("settings", &self.settings)
            .field("is_active", &self.is_active)
            .field("is_default", &self.is_default)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Insert data for a provider.
#[derive(Clone)]
pub struct NewProvider {
    pub name: String,
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub settings: ProviderSettings,
    pub is_active: bool,
    pub is_default: bool,
    pub priority: i32,
    pub description: Option<String>,
}

impl NewProvider {
    pub fn new(name: impl Into<String>, kind: ProviderKind, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            settings: ProviderSettings::default(),
            is_active: true,
            is_default: false,
            priority: 0,
            description: None,
        }
    }
}

impl ProviderConfig {
    pub fn new(id: ProviderId, new: NewProvider, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            kind: new.kind,
            api_key: new.api_key,
            model: new.model,
            base_url: new.base_url,
            settings: new.settings,
            is_active: new.is_active,
            is_default: new.is_default,
            priority: new.priority,
            description: new.description,
            created_at: now,
        }
    }
}
