//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::prompts::{article_prompt, trend_prompt};
use super::response::{parse_article, parse_trends};
use super::{ARTICLE_TIMEOUT, TREND_TIMEOUT};
use crate::config::VendorSettings;
use crate::domain::{Article, GenerationOptions, ProviderError, TaskPayload};
use crate::ports::{ContentGenerator, TrendSource};

const PROVIDER: &str = "gemini";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str, settings: &VendorSettings) -> Self {
        Self {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: settings.temperature,
                max_output_tokens: settings.max_tokens,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// `candidates[0].content.parts[0].text`
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Gemini client. Serves as both trend source and content generator.
pub struct GeminiClient {
    http: Client,
    settings: VendorSettings,
    topics: Vec<String>,
}

impl GeminiClient {
    pub fn new(settings: VendorSettings, topics: Vec<String>) -> Self {
        Self {
            http: Client::new(),
            settings,
            topics,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }

    async fn call(&self, prompt: &str, timeout: Duration) -> Result<String, ProviderError> {
        let api_key = self
            .settings
            .api_key()
            .ok_or(ProviderError::NotConfigured { provider: PROVIDER })?;

        debug!(model = %self.settings.model, prompt_len = prompt.len(), "calling gemini");
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .timeout(timeout)
            .json(&GenerateRequest::new(prompt, &self.settings))
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "gemini request failed");
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::response(PROVIDER, e.to_string()))?;
        parsed.into_text().ok_or_else(|| {
            ProviderError::response(PROVIDER, "missing candidates[0].content.parts[0].text")
        })
    }
}

#[async_trait]
impl TrendSource for GeminiClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search_trends(&self, count: u32) -> Result<Vec<TaskPayload>, ProviderError> {
        let prompt = trend_prompt(&self.topics, count);
        let text = self.call(&prompt, TREND_TIMEOUT).await?;
        let mut trends = parse_trends(PROVIDER, &text)?;
        trends.truncate(count as usize);
        info!(found = trends.len(), "gemini trends parsed");
        Ok(trends)
    }

    async fn validate_api_key(&self) -> bool {
        if self.settings.api_key().is_none() {
            return false;
        }
        self.call("Test connection", TREND_TIMEOUT).await.is_ok()
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate_article(
        &self,
        payload: &TaskPayload,
        options: &GenerationOptions,
    ) -> Result<Article, ProviderError> {
        let prompt = article_prompt(payload, options);
        let text = self.call(&prompt, ARTICLE_TIMEOUT).await?;
        parse_article(PROVIDER, &text)
    }

    async fn generate_featured_image(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        info!(prompt, "featured image prompt recorded");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> VendorSettings {
        VendorSettings {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta/".into(),
            model: "gemini-2.0-flash-exp".into(),
            temperature: 0.7,
            max_tokens: 8000,
        }
    }

    #[test]
    fn request_body_matches_generate_content_shape() {
        let body = serde_json::to_value(GenerateRequest::new("hi", &settings())).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8000);
        assert!(body["generationConfig"]["temperature"].as_f64().is_some());
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let client = GeminiClient::new(settings(), vec![]);
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent"
        );
    }

    #[test]
    fn extracts_first_candidate_text() {
        let raw = json!({
            "candidates": [{"content": {"parts": [{"text": "[]"}], "role": "model"}}]
        });
        let parsed: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("[]"));

        let empty: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.into_text().is_none());
    }

    #[tokio::test]
    async fn unconfigured_key_fails_without_network() {
        let client = GeminiClient::new(settings(), vec!["AI".into()]);
        assert!(matches!(
            client.search_trends(3).await,
            Err(ProviderError::NotConfigured { provider: "gemini" })
        ));
        assert!(!client.validate_api_key().await);
    }
}
