//! Image generation capability and its OpenAI-compatible implementation.

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ProviderError, ProviderResult};

/// Generated image size.
const IMAGE_SIZE: &str = "1024x1024";

/// Image generation capability: a fully built prompt in, raw image bytes
/// out. Prompt assembly (style anchor, consistency block, scene role) lives
/// in `lullaby_core::images`.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> ProviderResult<Vec<u8>>;
}

/// OpenAI images-API backed [`ImageGenerator`].
pub struct OpenAiImageGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiImageGenerator {
    pub fn new(client: reqwest::Client, base_url: String, api_key: String, model: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
        }
    }
}

#[derive(Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate(&self, prompt: &str) -> ProviderResult<Vec<u8>> {
        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "size": IMAGE_SIZE,
                "quality": "standard",
                "n": 1,
                "response_format": "b64_json",
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

        let body: ImagesResponse = response.json().await?;
        let encoded = body
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| {
                ProviderError::MissingData("image response contained no payload".into())
            })?;

        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| ProviderError::MissingData(format!("image payload not base64: {e}")))
    }
}
