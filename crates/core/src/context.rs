//! The story context: the single source of truth for regenerating later
//! chapters' prompts.
//!
//! Stored as `stories.context_json`. Every recognized field is enumerated
//! here with explicit defaulting rules, and the struct is validated once at
//! the story-creation boundary; continuation requests reconstruct tone,
//! voice, and language from it, never from request input.

use serde::{Deserialize, Deserializer, Serialize};

use crate::story::LengthTier;
use crate::voices::{VoiceTier, DEFAULT_VOICE_ID};

/// Context schema version written by this build.
pub const CONTEXT_VERSION: u32 = 1;

/// Immutable snapshot of the generation spec taken at story creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecSnapshot {
    pub tones: Vec<String>,
    pub length: LengthTier,
    pub paragraph_count: u32,
    pub style_hint: String,
}

/// The `stories.context_json` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryContext {
    /// Schema version for forward-compatible reads.
    pub version: u32,

    // -- Creation inputs --
    pub user_input: String,
    pub tags: Vec<String>,
    pub story_rules: String,
    pub voice_id: String,
    #[serde(deserialize_with = "lenient_voice_tier")]
    pub voice_tier: VoiceTier,
    pub language: String,
    pub include_images: bool,
    pub include_voice: bool,
    pub facts_only: bool,

    // -- Computed at creation --
    pub style_hint: String,
    pub rules_version: u32,
    /// The exact prompt used for the first chapter, kept for debugging.
    pub initial_prompt: String,
    pub spec_snapshot: Option<SpecSnapshot>,

    // -- Merged in after the media phase --
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_consistency_ref: Option<String>,
    /// Set when voice was requested but no paragraph received audio, so the
    /// UI can explain the missing playback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_warning: Option<String>,
}

impl Default for StoryContext {
    fn default() -> Self {
        Self {
            version: CONTEXT_VERSION,
            user_input: String::new(),
            tags: Vec::new(),
            story_rules: String::new(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            voice_tier: VoiceTier::Standard,
            language: "en".to_string(),
            include_images: true,
            include_voice: true,
            facts_only: false,
            style_hint: String::new(),
            rules_version: 1,
            initial_prompt: String::new(),
            spec_snapshot: None,
            summary: None,
            cover_image_url: None,
            visual_consistency_ref: None,
            voice_warning: None,
        }
    }
}

/// Accept any string for the voice tier; only exactly `"premium"` selects
/// premium. Older rows may carry values like `"premium-plus"`.
fn lenient_voice_tier<'de, D>(deserializer: D) -> Result<VoiceTier, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(VoiceTier::parse_lenient(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_has_documented_defaults() {
        let ctx = StoryContext::default();
        assert_eq!(ctx.version, CONTEXT_VERSION);
        assert_eq!(ctx.voice_id, "lily");
        assert_eq!(ctx.voice_tier, VoiceTier::Standard);
        assert_eq!(ctx.language, "en");
        assert!(ctx.include_images);
        assert!(ctx.include_voice);
        assert!(!ctx.facts_only);
    }

    #[test]
    fn unknown_fields_and_missing_fields_are_tolerated() {
        let json = r#"{"userInput":"a fox","someFutureField":42}"#;
        let ctx: StoryContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.user_input, "a fox");
        assert!(ctx.include_voice);
    }

    #[test]
    fn legacy_premium_plus_tier_reads_as_standard() {
        let json = r#"{"voiceTier":"premium-plus"}"#;
        let ctx: StoryContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.voice_tier, VoiceTier::Standard);

        let json = r#"{"voiceTier":"premium"}"#;
        let ctx: StoryContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.voice_tier, VoiceTier::Premium);
    }

    #[test]
    fn media_fields_round_trip() {
        let mut ctx = StoryContext {
            user_input: "a sleepy bear".to_string(),
            ..Default::default()
        };
        ctx.summary = Some("A bear learns to nap.".to_string());
        ctx.visual_consistency_ref = Some("Bruno: brown bear, round ears.".to_string());

        let json = serde_json::to_string(&ctx).unwrap();
        let back: StoryContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back.summary.as_deref(), Some("A bear learns to nap."));
        assert_eq!(
            back.visual_consistency_ref.as_deref(),
            Some("Bruno: brown bear, round ears.")
        );
    }
}
