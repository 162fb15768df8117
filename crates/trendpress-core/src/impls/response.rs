//! Parsing of model output shared by every vendor client.
//!
//! Models are asked for bare JSON but often wrap it in a markdown fence, so
//! fences are stripped before parsing.

use serde_json::Value;

use crate::domain::{Article, ProviderError, TaskPayload};

/// Remove a leading ```` ```json ```` (or bare ```` ``` ````) fence and a
/// trailing ```` ``` ````.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        text = rest.trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text
}

/// Parse a trend list. Every entry must carry `title`, `topic` and
/// `keywords`; one bad entry rejects the whole response.
pub fn parse_trends(provider: &'static str, raw: &str) -> Result<Vec<TaskPayload>, ProviderError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| ProviderError::response(provider, format!("trend list is not JSON: {e}")))?;

    let Value::Array(items) = value else {
        return Err(ProviderError::response(provider, "trend list is not an array"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let payload = TaskPayload::from_value(item).ok_or_else(|| {
                ProviderError::response(provider, format!("trend {i} is not an object"))
            })?;
            for field in ["title", "topic", "keywords"] {
                if payload.get(field).is_none_or(Value::is_null) {
                    return Err(ProviderError::response(
                        provider,
                        format!("trend {i} is missing `{field}`"),
                    ));
                }
            }
            Ok(payload)
        })
        .collect()
}

fn required_text(object: &serde_json::Map<String, Value>, field: &str) -> Result<String, ProviderError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ProviderError::MissingField(field.to_string()))
}

/// Reading time may come back as a number or a numeric string.
fn reading_time(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse an article object. `title`, `content`, `meta_description` and
/// `featured_image_prompt` must be non-empty strings.
pub fn parse_article(provider: &'static str, raw: &str) -> Result<Article, ProviderError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| ProviderError::response(provider, format!("article is not JSON: {e}")))?;

    let Value::Object(object) = value else {
        return Err(ProviderError::response(provider, "article is not an object"));
    };

    Ok(Article {
        title: required_text(&object, "title")?,
        content: required_text(&object, "content")?,
        meta_description: required_text(&object, "meta_description")?,
        featured_image_prompt: required_text(&object, "featured_image_prompt")?,
        estimated_reading_time: reading_time(object.get("estimated_reading_time")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("```json\n[1]\n```", "[1]")]
    #[case("```\n{}\n```", "{}")]
    #[case("  [1]  ", "[1]")]
    #[case("```json[1]```", "[1]")]
    fn strips_fences(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(strip_code_fence(raw), expected);
    }

    #[test]
    fn parses_fenced_trend_list() {
        let raw = r#"```json
[
  {"title": "Rust in the Kernel", "topic": "Systems", "keywords": ["rust", "linux"],
   "description": "Why it matters", "source_url": "https://lwn.net/"}
]
```"#;
        let trends = parse_trends("gemini", raw).unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].title(), Some("Rust in the Kernel"));
        assert_eq!(trends[0].keywords(), vec!["rust", "linux"]);
        assert_eq!(trends[0].source_url(), Some("https://lwn.net/"));
    }

    #[test]
    fn one_incomplete_trend_rejects_the_response() {
        let raw = r#"[
            {"title": "A", "topic": "AI", "keywords": []},
            {"title": "B", "topic": "AI"}
        ]"#;
        let err = parse_trends("gemini", raw).unwrap_err();
        assert!(matches!(err, ProviderError::Response { .. }));
        assert!(err.to_string().contains("keywords"));
    }

    #[rstest]
    #[case("not json at all")]
    #[case(r#"{"title": "x"}"#)]
    fn trend_list_must_be_a_json_array(#[case] raw: &str) {
        assert!(matches!(
            parse_trends("openai", raw),
            Err(ProviderError::Response { provider: "openai", .. })
        ));
    }

    #[test]
    fn parses_article_with_string_reading_time() {
        let raw = r#"{"title": "T", "content": "<p>c</p>", "meta_description": "m",
                      "featured_image_prompt": "p", "estimated_reading_time": "7"}"#;
        let article = parse_article("gemini", raw).unwrap();
        assert_eq!(article.title, "T");
        assert_eq!(article.estimated_reading_time, Some(7));
    }

    #[rstest]
    #[case("title")]
    #[case("content")]
    #[case("meta_description")]
    #[case("featured_image_prompt")]
    fn article_fields_are_required(#[case] missing: &str) {
        let mut object = serde_json::json!({
            "title": "T", "content": "<p>c</p>", "meta_description": "m",
            "featured_image_prompt": "p", "estimated_reading_time": 5
        });
        object[missing] = Value::String(String::new());
        let err = parse_article("gemini", &object.to_string()).unwrap_err();
        assert!(matches!(err, ProviderError::MissingField(f) if f == missing));
    }
}
