//! Generation capability interfaces and their REST implementations.
//!
//! Each external capability (text, speech, image) is an `async_trait` object
//! constructed once at process start and injected into the orchestrator, so
//! substep failure injection is trivial in tests.

pub mod error;
pub mod image;
pub mod parse;
pub mod speech;
pub mod text;

use std::sync::Arc;

pub use error::{ProviderError, ProviderResult};
pub use image::{ImageGenerator, OpenAiImageGenerator};
pub use parse::TitleSummary;
pub use speech::{GoogleSpeechSynthesizer, SpeechRequest, SpeechSynthesizer};
pub use text::{OpenAiTextGenerator, TextGenerator};

/// Provider configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    /// OpenAI-compatible API key for text and image generation.
    pub openai_api_key: String,
    /// Base URL for the OpenAI-compatible API.
    pub openai_base_url: String,
    /// Chat model used for paragraphs, titles, and visual references.
    pub text_model: String,
    /// Image model.
    pub image_model: String,
    /// Google-style TTS API key. Ignored when `tts_disabled` is set.
    pub tts_api_key: String,
    /// Base URL for the TTS REST API.
    pub tts_base_url: String,
    /// Kill switch: when true the speech capability is absent entirely.
    pub tts_disabled: bool,
}

impl ProvidersConfig {
    /// Load provider configuration from environment variables.
    ///
    /// | Env Var               | Required | Default                                |
    /// |-----------------------|----------|----------------------------------------|
    /// | `OPENAI_API_KEY`      | **yes**  | --                                     |
    /// | `OPENAI_BASE_URL`     | no       | `https://api.openai.com/v1`            |
    /// | `TEXT_MODEL`          | no       | `gpt-4o-mini`                          |
    /// | `IMAGE_MODEL`         | no       | `dall-e-3`                             |
    /// | `GOOGLE_TTS_API_KEY`  | no*      | --                                     |
    /// | `GOOGLE_TTS_BASE_URL` | no       | `https://texttospeech.googleapis.com`  |
    /// | `TTS_DISABLED`        | no       | unset                                  |
    ///
    /// *Required unless `TTS_DISABLED` is `true`/`1`.
    pub fn from_env() -> Self {
        let openai_api_key =
            std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");
        let openai_base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let text_model = std::env::var("TEXT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        let image_model = std::env::var("IMAGE_MODEL").unwrap_or_else(|_| "dall-e-3".into());

        let tts_disabled = matches!(
            std::env::var("TTS_DISABLED").as_deref(),
            Ok("true") | Ok("1")
        );
        let tts_api_key = if tts_disabled {
            String::new()
        } else {
            std::env::var("GOOGLE_TTS_API_KEY")
                .expect("GOOGLE_TTS_API_KEY must be set (or set TTS_DISABLED=true)")
        };
        let tts_base_url = std::env::var("GOOGLE_TTS_BASE_URL")
            .unwrap_or_else(|_| "https://texttospeech.googleapis.com".into());

        Self {
            openai_api_key,
            openai_base_url,
            text_model,
            image_model,
            tts_api_key,
            tts_base_url,
            tts_disabled,
        }
    }
}

/// The capability bundle injected into the orchestrator.
///
/// `speech` is `None` when narration is disabled at the environment level;
/// stories requesting voice then degrade exactly like a total synthesis
/// failure.
#[derive(Clone)]
pub struct Providers {
    pub text: Arc<dyn TextGenerator>,
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub image: Arc<dyn ImageGenerator>,
}

impl Providers {
    /// Construct the concrete REST-backed providers from configuration.
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let http = reqwest::Client::new();
        let speech: Option<Arc<dyn SpeechSynthesizer>> = if config.tts_disabled {
            None
        } else {
            Some(Arc::new(GoogleSpeechSynthesizer::new(
                http.clone(),
                config.tts_base_url.clone(),
                config.tts_api_key.clone(),
            )))
        };
        Self {
            text: Arc::new(OpenAiTextGenerator::new(
                http.clone(),
                config.openai_base_url.clone(),
                config.openai_api_key.clone(),
                config.text_model.clone(),
            )),
            speech,
            image: Arc::new(OpenAiImageGenerator::new(
                http,
                config.openai_base_url.clone(),
                config.openai_api_key.clone(),
                config.image_model.clone(),
            )),
        }
    }
}
