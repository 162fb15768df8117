//! Offline vendor for development and demos.
//!
//! Produces deterministic trends and articles without network access, so the
//! whole pipeline can be exercised with `kind = mock`.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::{Article, GenerationOptions, ProviderError, TaskPayload, slugify};
use crate::ports::{ContentGenerator, TrendSource};

const PROVIDER: &str = "mock";

/// Deterministic stand-in for a vendor.
pub struct MockProvider {
    topics: Vec<String>,
}

impl MockProvider {
    pub fn new(topics: Vec<String>) -> Self {
        Self { topics }
    }

    fn topic(&self, i: usize) -> &str {
        if self.topics.is_empty() {
            "Technology"
        } else {
            &self.topics[i % self.topics.len()]
        }
    }
}

#[async_trait]
impl TrendSource for MockProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search_trends(&self, count: u32) -> Result<Vec<TaskPayload>, ProviderError> {
        let trends = (0..count as usize)
            .map(|i| {
                let topic = self.topic(i);
                let title = format!("What's Next in {topic} ({})", i + 1);
                TaskPayload::trend(title, topic)
                    .with("keywords", json!([topic.to_lowercase(), "trends"]))
                    .with("description", format!("A look at where {topic} is heading."))
                    .with("source_url", format!("https://example.com/{}", slugify(topic)))
            })
            .collect();
        debug!(count, "mock trends generated");
        Ok(trends)
    }

    async fn validate_api_key(&self) -> bool {
        true
    }
}

#[async_trait]
impl ContentGenerator for MockProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate_article(
        &self,
        payload: &TaskPayload,
        options: &GenerationOptions,
    ) -> Result<Article, ProviderError> {
        let title = payload
            .title()
            .ok_or_else(|| ProviderError::MissingField("title".to_string()))?;
        let topic = payload.topic().unwrap_or("Technology");
        let mut content = format!(
            "<h2>{title}</h2><p>An overview of {topic} written in `{}`.</p>",
            options.language
        );
        if options.include_code_examples {
            content.push_str("<pre><code>fn main() {}</code></pre>");
        }

        Ok(Article {
            title: title.to_string(),
            content,
            meta_description: format!("{title}: a short read on {topic}."),
            featured_image_prompt: format!("An illustration of {topic}"),
            estimated_reading_time: Some(options.min_words / 200),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trends_cycle_through_topics() {
        let mock = MockProvider::new(vec!["AI".into(), "DevOps".into()]);
        let trends = mock.search_trends(3).await.unwrap();
        let topics: Vec<_> = trends.iter().map(|t| t.topic().unwrap()).collect();
        assert_eq!(topics, vec!["AI", "DevOps", "AI"]);
        assert!(trends.iter().all(|t| !t.keywords().is_empty()));
    }

    #[tokio::test]
    async fn article_echoes_title_and_respects_code_flag() {
        let mock = MockProvider::new(vec![]);
        let options = GenerationOptions {
            include_code_examples: false,
            ..GenerationOptions::default()
        };
        let article = mock
            .generate_article(&TaskPayload::trend("Edge AI", "AI"), &options)
            .await
            .unwrap();
        assert_eq!(article.title, "Edge AI");
        assert!(!article.content.contains("<pre>"));
        assert_eq!(article.estimated_reading_time, Some(4));
    }
}
