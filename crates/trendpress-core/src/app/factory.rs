//! Provider factory: stored provider config -> vendor clients.

use crate::config::{Settings, VendorSettings};
use crate::domain::{ProviderConfig, ProviderKind};
use crate::impls::openai::OPENROUTER_BASE_URL;
use crate::impls::{GeminiClient, MockProvider, OpenAiClient};
use crate::ports::{ContentGenerator, TrendSource};

/// Builds trend sources and content generators.
///
/// With no stored provider, falls back to the Gemini settings from the
/// environment.
#[derive(Debug, Clone)]
pub struct ProviderFactory {
    settings: Settings,
}

impl ProviderFactory {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Connection settings for `config`; missing base URLs use the vendor default.
    pub fn vendor_settings(&self, config: &ProviderConfig) -> VendorSettings {
        let default_base = match config.kind {
            ProviderKind::Gemini | ProviderKind::Mock => self.settings.gemini.base_url.clone(),
            ProviderKind::OpenAi => self.settings.openai.base_url.clone(),
            ProviderKind::OpenRouter => OPENROUTER_BASE_URL.to_string(),
        };
        VendorSettings {
            api_key: Some(config.api_key.clone()),
            base_url: config.base_url.clone().unwrap_or(default_base),
            model: config.model.clone(),
            temperature: config.settings.temperature,
            max_tokens: config.settings.max_tokens,
        }
    }

    fn topics(&self) -> Vec<String> {
        self.settings.trends.topics.clone()
    }

    pub fn trend_source(&self, config: Option<&ProviderConfig>) -> Box<dyn TrendSource> {
        let Some(config) = config else {
            return Box::new(GeminiClient::new(self.settings.gemini.clone(), self.topics()));
        };
        let settings = self.vendor_settings(config);
        match config.kind {
            ProviderKind::Gemini => Box::new(GeminiClient::new(settings, self.topics())),
            ProviderKind::OpenAi | ProviderKind::OpenRouter => {
                Box::new(OpenAiClient::new(config.kind, settings, self.topics()))
            }
            ProviderKind::Mock => Box::new(MockProvider::new(self.topics())),
        }
    }

    pub fn content_generator(&self, config: Option<&ProviderConfig>) -> Box<dyn ContentGenerator> {
        let Some(config) = config else {
            return Box::new(GeminiClient::new(self.settings.gemini.clone(), self.topics()));
        };
        let settings = self.vendor_settings(config);
        match config.kind {
            ProviderKind::Gemini => Box::new(GeminiClient::new(settings, self.topics())),
            ProviderKind::OpenAi | ProviderKind::OpenRouter => {
                Box::new(OpenAiClient::new(config.kind, settings, self.topics()))
            }
            ProviderKind::Mock => Box::new(MockProvider::new(self.topics())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewProvider, ProviderId};
    use chrono::Utc;
    use rstest::rstest;

    fn config(kind: ProviderKind, base_url: Option<&str>) -> ProviderConfig {
        let mut new = NewProvider::new("p", kind, "key", "model-x");
        new.base_url = base_url.map(String::from);
        ProviderConfig::new(ProviderId::new(1), new, Utc::now())
    }

    #[rstest]
    #[case(None, "gemini")]
    #[case(Some(ProviderKind::Gemini), "gemini")]
    #[case(Some(ProviderKind::OpenAi), "openai")]
    #[case(Some(ProviderKind::OpenRouter), "openrouter")]
    #[case(Some(ProviderKind::Mock), "mock")]
    fn selects_client_by_kind(#[case] kind: Option<ProviderKind>, #[case] expected: &str) {
        let factory = ProviderFactory::new(Settings::default());
        let config = kind.map(|k| config(k, None));

        assert_eq!(factory.trend_source(config.as_ref()).name(), expected);
        assert_eq!(factory.content_generator(config.as_ref()).name(), expected);
    }

    #[rstest]
    #[case(ProviderKind::Gemini, None, "https://generativelanguage.googleapis.com/v1beta")]
    #[case(ProviderKind::OpenAi, None, "https://api.openai.com/v1")]
    #[case(ProviderKind::OpenRouter, None, "https://openrouter.ai/api/v1")]
    #[case(ProviderKind::OpenAi, Some("http://localhost:8080/v1"), "http://localhost:8080/v1")]
    fn base_url_defaults_per_kind(
        #[case] kind: ProviderKind,
        #[case] base: Option<&str>,
        #[case] expected: &str,
    ) {
        let factory = ProviderFactory::new(Settings::default());
        let settings = factory.vendor_settings(&config(kind, base));
        assert_eq!(settings.base_url, expected);
        assert_eq!(settings.model, "model-x");
        assert_eq!(settings.api_key(), Some("key"));
    }
}
