//! Speech synthesis capability and its Google TTS REST implementation.

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

use lullaby_core::language::language_option;
use lullaby_core::voices::{voice_option, VoiceTier};

use crate::error::{ProviderError, ProviderResult};

/// Narration parameters resolved from the story context.
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// Narrator id from the voice catalog (e.g. `"lily"`).
    pub voice_id: String,
    pub voice_tier: VoiceTier,
    /// Story language id (e.g. `"sv"`).
    pub language: String,
}

/// Speech synthesis capability: paragraph text in, MP3 bytes out.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, request: &SpeechRequest) -> ProviderResult<Vec<u8>>;
}

/// Standard-tier narrator voices for non-English languages. Premium voices
/// use the same model-backed voice in every language, so only the standard
/// tier needs a per-language table.
const NON_ENGLISH_STANDARD_VOICES: [(&str, &str, &str); 14] = [
    ("es-ES", "lily", "es-ES-Neural2-A"),
    ("es-ES", "emma", "es-ES-Neural2-E"),
    ("es-ES", "walter", "es-ES-Neural2-F"),
    ("es-ES", "rose", "es-ES-Neural2-H"),
    ("es-ES", "george", "es-ES-Neural2-F"),
    ("es-ES", "leo", "es-ES-Neural2-G"),
    ("es-ES", "theo", "es-ES-Neural2-G"),
    ("sv-SE", "lily", "sv-SE-Wavenet-A"),
    ("sv-SE", "emma", "sv-SE-Wavenet-B"),
    ("sv-SE", "walter", "sv-SE-Wavenet-C"),
    ("sv-SE", "rose", "sv-SE-Wavenet-D"),
    ("sv-SE", "george", "sv-SE-Wavenet-E"),
    ("sv-SE", "leo", "sv-SE-Wavenet-F"),
    ("sv-SE", "theo", "sv-SE-Wavenet-G"),
];

/// Fallback voice per non-English language for narrators missing from the
/// table.
const DEFAULT_NON_ENGLISH_VOICE: [(&str, &str); 2] =
    [("es-ES", "es-ES-Neural2-A"), ("sv-SE", "sv-SE-Wavenet-A")];

/// Spanish narration reads slower for clearer, calmer delivery.
const SPANISH_SPEAKING_RATE: f64 = 0.7;
const DEFAULT_SPEAKING_RATE: f64 = 1.1;

/// Resolve the synthesis voice name for a narrator/tier/language triple.
fn resolve_voice_name(voice_id: &str, tier: VoiceTier, speech_code: &str) -> &'static str {
    let option = voice_option(voice_id);
    match tier {
        // Premium: one voice across all languages so the narrator stays
        // consistent when a family mixes languages.
        VoiceTier::Premium => option.premium_voice,
        VoiceTier::Standard if speech_code == "en-US" => option.english_voice,
        VoiceTier::Standard => NON_ENGLISH_STANDARD_VOICES
            .iter()
            .find(|(code, id, _)| *code == speech_code && *id == option.id)
            .map(|(_, _, name)| *name)
            .or_else(|| {
                DEFAULT_NON_ENGLISH_VOICE
                    .iter()
                    .find(|(code, _)| *code == speech_code)
                    .map(|(_, name)| *name)
            })
            .unwrap_or(option.english_voice),
    }
}

fn speaking_rate(speech_code: &str) -> f64 {
    if speech_code == "es-ES" {
        SPANISH_SPEAKING_RATE
    } else {
        DEFAULT_SPEAKING_RATE
    }
}

/// Google Cloud TTS REST backed [`SpeechSynthesizer`].
pub struct GoogleSpeechSynthesizer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleSpeechSynthesizer {
    pub fn new(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeechSynthesizer {
    async fn synthesize(&self, text: &str, request: &SpeechRequest) -> ProviderResult<Vec<u8>> {
        let speech_code = language_option(&request.language).speech_code;
        let voice_name = resolve_voice_name(&request.voice_id, request.voice_tier, speech_code);

        let response = self
            .client
            .post(format!(
                "{}/v1/text:synthesize?key={}",
                self.base_url, self.api_key
            ))
            .json(&json!({
                "input": { "text": text },
                "voice": { "languageCode": speech_code, "name": voice_name },
                "audioConfig": {
                    "audioEncoding": "MP3",
                    "speakingRate": speaking_rate(speech_code),
                },
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

        let body: SynthesizeResponse = response.json().await?;
        let encoded = body.audio_content.ok_or_else(|| {
            ProviderError::MissingData("synthesis response contained no audio".into())
        })?;

        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| ProviderError::MissingData(format!("audio payload not base64: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_standard_uses_catalog_voice() {
        assert_eq!(
            resolve_voice_name("lily", VoiceTier::Standard, "en-US"),
            "en-US-Neural2-F"
        );
    }

    #[test]
    fn premium_voice_is_language_independent() {
        let en = resolve_voice_name("walter", VoiceTier::Premium, "en-US");
        let sv = resolve_voice_name("walter", VoiceTier::Premium, "sv-SE");
        let es = resolve_voice_name("walter", VoiceTier::Premium, "es-ES");
        assert_eq!(en, sv);
        assert_eq!(sv, es);
    }

    #[test]
    fn non_english_standard_uses_language_table() {
        assert_eq!(
            resolve_voice_name("emma", VoiceTier::Standard, "sv-SE"),
            "sv-SE-Wavenet-B"
        );
        assert_eq!(
            resolve_voice_name("rose", VoiceTier::Standard, "es-ES"),
            "es-ES-Neural2-H"
        );
    }

    #[test]
    fn unknown_narrator_falls_back_per_language() {
        // Unknown narrators resolve to the default narrator first, which is
        // present in every language table.
        assert_eq!(
            resolve_voice_name("nobody", VoiceTier::Standard, "sv-SE"),
            "sv-SE-Wavenet-A"
        );
    }

    #[test]
    fn spanish_reads_slower() {
        assert_eq!(speaking_rate("es-ES"), 0.7);
        assert_eq!(speaking_rate("en-US"), 1.1);
        assert_eq!(speaking_rate("sv-SE"), 1.1);
    }
}
