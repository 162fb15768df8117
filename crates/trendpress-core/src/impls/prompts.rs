//! Prompt text sent to the vendors.

use crate::domain::{GenerationOptions, TaskPayload};

pub fn trend_prompt(topics: &[String], count: u32) -> String {
    let topics = topics.join(", ");
    format!(
        r#"You are a tech trends analyst. Your task is to identify the top {count} trending topics in the following areas: {topics}.

Please provide EXACTLY {count} trending topics that are:
1. Currently popular and relevant
2. Interesting for a technical blog audience
3. Have enough depth for a detailed article
4. Cover different aspects of technology

For each trend, provide:
- Title: A catchy, SEO-friendly title (max 80 characters)
- Topic: The main subject area
- Keywords: 3-5 relevant keywords
- Description: A brief 2-3 sentence description
- Source URL: A credible source URL (use real, existing URLs from tech news sites)

Format your response as a JSON array with this structure:
[
  {{
    "title": "...",
    "topic": "...",
    "keywords": ["...", "...", "..."],
    "description": "...",
    "source_url": "..."
  }}
]

IMPORTANT: Return ONLY the JSON array, no additional text or markdown formatting."#
    )
}

struct LanguageNotes {
    instruction: &'static str,
    title: &'static str,
    content: &'static str,
}

fn language_notes(options: &GenerationOptions) -> LanguageNotes {
    if options.is_arabic() {
        LanguageNotes {
            instruction: "Write the ENTIRE article in professional, clear, Modern Standard Arabic (الفصحى)",
            title: "العنوان يجب أن يكون بالعربية",
            content: "المحتوى الكامل يجب أن يكون بالعربية الفصحى",
        }
    } else {
        LanguageNotes {
            instruction: "Write in professional, clear English",
            title: "Title should be in English",
            content: "Full content should be in English",
        }
    }
}

pub fn article_prompt(payload: &TaskPayload, options: &GenerationOptions) -> String {
    let title = payload.title().unwrap_or_default();
    let topic = payload.topic().unwrap_or_default();
    let keywords = payload.keywords().join(", ");
    let context = payload.description().unwrap_or_default();
    let min_words = options.min_words;
    let max_words = options.max_words;
    let notes = language_notes(options);
    let language = notes.instruction;
    let title_note = notes.title;
    let content_note = notes.content;
    let code_requirement = if options.include_code_examples {
        "8. Include relevant code examples where appropriate (use <pre><code> tags)"
    } else {
        ""
    };

    format!(
        r#"You are a professional tech blogger and content writer. Write a comprehensive, SEO-optimized technical article about: "{title}"

Topic: {topic}
Keywords to include: {keywords}
Context: {context}

CRITICAL LANGUAGE REQUIREMENT:
{language}
{title_note}
{content_note}

Requirements:
1. Write between {min_words}-{max_words} words
2. Use a catchy, engaging title (you can improve the provided title)
3. Structure with proper H2 and H3 headings
4. IMPORTANT: {language} - ALL text including title, content, headings, and meta description
5. Include practical insights and real-world applications
6. Make it SEO-friendly with natural keyword integration
7. Add a compelling introduction and conclusion
{code_requirement}

Format your response as JSON with this EXACT structure:
{{
  "title": "The final article title IN THE SPECIFIED LANGUAGE",
  "content": "Full HTML content with <h2>, <h3>, <p>, <ul>, <ol>, <code>, <pre> tags IN THE SPECIFIED LANGUAGE",
  "meta_description": "SEO meta description (max 160 characters) IN THE SPECIFIED LANGUAGE",
  "featured_image_prompt": "A detailed prompt for AI image generation (this can be in English)",
  "estimated_reading_time": 5
}}

IMPORTANT:
- Return ONLY the JSON object, no additional text or markdown formatting
- The content should be in HTML format with proper tags
- Use <h2> for main sections and <h3> for subsections
- Make the content engaging and valuable for readers
- LANGUAGE: {language}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_prompt_lists_topics_and_count() {
        let prompt = trend_prompt(&["DevOps".to_string(), "Cybersecurity".to_string()], 3);
        assert!(prompt.contains("top 3 trending topics"));
        assert!(prompt.contains("DevOps, Cybersecurity"));
        assert!(prompt.contains("EXACTLY 3"));
    }

    #[test]
    fn article_prompt_carries_payload_and_word_range() {
        let payload = TaskPayload::trend("WebGPU Arrives", "Web Development")
            .with("keywords", serde_json::json!(["webgpu", "graphics"]))
            .with("description", "Browsers ship GPU compute.");
        let options = GenerationOptions::default();

        let prompt = article_prompt(&payload, &options);
        assert!(prompt.contains(r#"about: "WebGPU Arrives""#));
        assert!(prompt.contains("Keywords to include: webgpu, graphics"));
        assert!(prompt.contains("Context: Browsers ship GPU compute."));
        assert!(prompt.contains("between 800-1500 words"));
        assert!(prompt.contains("8. Include relevant code examples"));
        assert!(prompt.contains("Write in professional, clear English"));
    }

    #[test]
    fn arabic_and_no_code_change_the_instructions() {
        let payload = TaskPayload::trend("t", "AI");
        let options = GenerationOptions {
            include_code_examples: false,
            ..GenerationOptions::default()
        }
        .with_language("ar");

        let prompt = article_prompt(&payload, &options);
        assert!(prompt.contains("Modern Standard Arabic"));
        assert!(!prompt.contains("code examples where appropriate"));
    }
}
