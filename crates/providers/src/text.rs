//! Text generation capability and its OpenAI-compatible implementation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ProviderError, ProviderResult};
use crate::parse::{parse_paragraph_array, parse_title_summary, TitleSummary};

/// Input text for the visual reference call is bounded to this many chars.
const VISUAL_REF_INPUT_MAX_CHARS: usize = 2000;

/// The visual reference itself is bounded to this many chars.
const VISUAL_REF_OUTPUT_MAX_CHARS: usize = 400;

/// Opening-paragraph excerpt sent to the title/summary call.
const TITLE_INPUT_MAX_CHARS: usize = 500;

/// Text generation capability.
///
/// Implementations return untrusted provider text already validated against
/// the paragraph-array contract; callers still own the title/summary
/// fallback policy.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a chapter's paragraphs from a compiled prompt. The returned
    /// order is canonical.
    async fn generate_paragraphs(&self, prompt: &str) -> ProviderResult<Vec<String>>;

    /// Generate a title and short summary from the opening paragraph.
    async fn generate_title_and_summary(
        &self,
        first_paragraph: &str,
        language: &str,
    ) -> ProviderResult<TitleSummary>;

    /// Generate the cross-image character/palette description for a chapter.
    async fn generate_visual_reference(
        &self,
        chapter_text: &str,
        language: &str,
    ) -> ProviderResult<String>;
}

const PARAGRAPHS_SYSTEM_PROMPT: &str = "You respond only with valid JSON. No markdown, no \
    code blocks, no extra text. Just the raw JSON array.";

const VISUAL_REF_SYSTEM_PROMPT: &str = "You create a visual reference for a children's book \
    illustrator. Output a single paragraph (2-4 sentences, max 120 words) that will be used \
    for EVERY illustration in the same story. Characters must look IDENTICAL in every image.\n\
    \n\
    Include:\n\
    1. Each main character ONLY: species, exact colors, distinctive features (e.g. \"orange \
    fur, white chest patch\"), face/eye style. Be very specific so the illustrator draws the \
    same character every time.\n\
    2. General palette: \"Muted earthy tones, moss greens, ochre, soft cream\" (or similar).\n\
    3. Note: \"Same character design in every scene. Setting and location CAN vary between \
    illustrations - each scene may show a different moment in a different place.\"\n\
    \n\
    Do NOT lock the setting to one place. The story may move. Characters stay the same; \
    where they are can change.";

/// OpenAI chat-completions backed [`TextGenerator`].
pub struct OpenAiTextGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiTextGenerator {
    pub fn new(client: reqwest::Client, base_url: String, api_key: String, model: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
        }
    }

    /// One chat completion round trip; returns the first choice's content.
    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> ProviderResult<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": user },
                ],
                "temperature": temperature,
                "max_tokens": max_tokens,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::MissingData("chat completion had no content".into()))
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    async fn generate_paragraphs(&self, prompt: &str) -> ProviderResult<Vec<String>> {
        let content = self.chat(PARAGRAPHS_SYSTEM_PROMPT, prompt, 0.8, 4096).await?;
        parse_paragraph_array(&content)
    }

    async fn generate_title_and_summary(
        &self,
        first_paragraph: &str,
        language: &str,
    ) -> ProviderResult<TitleSummary> {
        let system = format!(
            "You respond only with valid JSON. No markdown. Return {{\"title\": \"...\", \
             \"summary\": \"...\"}}. Title: 5-10 words, catchy. Summary: 1-2 sentences, \
             ~80-120 characters, enough to understand the story context. Return both title \
             and summary in {language}."
        );
        let excerpt: String = first_paragraph.chars().take(TITLE_INPUT_MAX_CHARS).collect();
        let user =
            format!("Story opening: \"{excerpt}\"\n\nReturn JSON with title and summary in {language}.");

        let content = self.chat(&system, &user, 0.7, 150).await?;
        parse_title_summary(&content).ok_or_else(|| {
            ProviderError::MalformedOutput("title/summary response was not the expected JSON".into())
        })
    }

    async fn generate_visual_reference(
        &self,
        chapter_text: &str,
        language: &str,
    ) -> ProviderResult<String> {
        let bounded: String = chapter_text
            .chars()
            .take(VISUAL_REF_INPUT_MAX_CHARS)
            .collect();
        let system = format!("{VISUAL_REF_SYSTEM_PROMPT}\n\nWrite in {language}.");
        let user = format!("Story text:\n\n{bounded}\n\nCreate the visual consistency reference:");

        let content = self.chat(&system, &user, 0.5, 200).await?;
        let reference: String = content
            .trim()
            .chars()
            .take(VISUAL_REF_OUTPUT_MAX_CHARS)
            .collect();
        if reference.is_empty() {
            return Err(ProviderError::MissingData(
                "visual reference was empty".into(),
            ));
        }
        Ok(reference)
    }
}
