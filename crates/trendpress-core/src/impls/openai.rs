//! OpenAI-compatible chat-completions client (OpenAI, OpenRouter).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::prompts::{article_prompt, trend_prompt};
use super::response::{parse_article, parse_trends};
use super::{ARTICLE_TIMEOUT, TREND_TIMEOUT};
use crate::config::VendorSettings;
use crate::domain::{Article, GenerationOptions, ProviderError, ProviderKind, TaskPayload};
use crate::ports::{ContentGenerator, TrendSource};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatResponse {
    /// `choices[0].message.content`
    fn into_text(self) -> Option<String> {
        self.choices.into_iter().next()?.message?.content
    }
}

/// Chat-completions client. `provider` is the name used in errors and logs.
pub struct OpenAiClient {
    http: Client,
    provider: &'static str,
    settings: VendorSettings,
    topics: Vec<String>,
}

impl OpenAiClient {
    pub fn new(kind: ProviderKind, settings: VendorSettings, topics: Vec<String>) -> Self {
        let provider = match kind {
            ProviderKind::OpenRouter => "openrouter",
            _ => "openai",
        };
        Self {
            http: Client::new(),
            provider,
            settings,
            topics,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    async fn call(&self, prompt: &str, timeout: Duration) -> Result<String, ProviderError> {
        let provider = self.provider;
        let api_key = self
            .settings
            .api_key()
            .ok_or(ProviderError::NotConfigured { provider })?;

        let request = ChatRequest {
            model: &self.settings.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        debug!(provider, model = %self.settings.model, "calling chat completions");
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|source| ProviderError::Transport { provider, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(provider, status = status.as_u16(), "chat completions request failed");
            return Err(ProviderError::Status {
                provider,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::response(provider, e.to_string()))?;
        parsed
            .into_text()
            .ok_or_else(|| ProviderError::response(provider, "missing choices[0].message.content"))
    }
}

#[async_trait]
impl TrendSource for OpenAiClient {
    fn name(&self) -> &'static str {
        self.provider
    }

    async fn search_trends(&self, count: u32) -> Result<Vec<TaskPayload>, ProviderError> {
        let prompt = trend_prompt(&self.topics, count);
        let text = self.call(&prompt, TREND_TIMEOUT).await?;
        let mut trends = parse_trends(self.provider, &text)?;
        trends.truncate(count as usize);
        info!(provider = self.provider, found = trends.len(), "trends parsed");
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
impl ContentGenerator for OpenAiClient {
    fn name(&self) -> &'static str {
        self.provider
    }

    async fn generate_article(
        &self,
        payload: &TaskPayload,
        options: &GenerationOptions,
    ) -> Result<Article, ProviderError> {
        let prompt = article_prompt(payload, options);
        let text = self.call(&prompt, ARTICLE_TIMEOUT).await?;
        parse_article(self.provider, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(base_url: &str) -> VendorSettings {
        VendorSettings {
            api_key: Some(String::new()),
            base_url: base_url.into(),
            model: "gpt-4".into(),
            temperature: 0.7,
            max_tokens: 4000,
        }
    }

    #[test]
    fn openrouter_kind_names_itself() {
        let client = OpenAiClient::new(ProviderKind::OpenRouter, settings(OPENROUTER_BASE_URL), vec![]);
        assert_eq!(TrendSource::name(&client), "openrouter");
        assert_eq!(client.endpoint(), "https://openrouter.ai/api/v1/chat/completions");
    }

    #[test]
    fn request_serializes_as_chat_completion() {
        let request = ChatRequest {
            model: "gpt-4",
            messages: [ChatMessage {
                role: "user",
                content: "hello",
            }],
            temperature: 0.5,
            max_tokens: 100,
        };
        let v = serde_json::to_value(&request).unwrap();
        assert_eq!(v["messages"][0]["role"], "user");
        assert_eq!(v["messages"][0]["content"], "hello");
        assert_eq!(v["max_tokens"], 100);
    }

    #[test]
    fn extracts_first_choice_content() {
        let parsed: ChatResponse = serde_json::from_value(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{}"}}]
        }))
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn blank_key_counts_as_unconfigured() {
        let client = OpenAiClient::new(ProviderKind::OpenAi, settings("https://api.openai.com/v1"), vec![]);
        let err = client
            .generate_article(&TaskPayload::trend("t", "AI"), &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured { provider: "openai" }));
    }
}
