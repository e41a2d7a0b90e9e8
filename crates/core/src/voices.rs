//! Narrator voice catalog and tier handling.

use serde::{Deserialize, Serialize};

/// Narration quality tier. Anything that is not exactly `"premium"`
/// deserializes/parses to `Standard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoiceTier {
    #[default]
    Standard,
    Premium,
}

impl VoiceTier {
    pub fn as_str(self) -> &'static str {
        match self {
            VoiceTier::Standard => "standard",
            VoiceTier::Premium => "premium",
        }
    }

    /// Lenient parse for context values: only the exact string `"premium"`
    /// selects the premium tier.
    pub fn parse_lenient(value: &str) -> Self {
        if value == "premium" {
            VoiceTier::Premium
        } else {
            VoiceTier::Standard
        }
    }
}

/// Default narrator when the request omits a voice id.
pub const DEFAULT_VOICE_ID: &str = "lily";

/// A narrator option selectable in the create form.
#[derive(Debug, Clone, Copy)]
pub struct VoiceOption {
    /// Stable narrator id stored in the story context.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// English standard-tier synthesis voice.
    pub english_voice: &'static str,
    /// Premium-tier synthesis voice (one voice across all languages).
    pub premium_voice: &'static str,
}

/// The narrator catalog. Order matches the create-form dropdown.
pub const VOICE_OPTIONS: [VoiceOption; 7] = [
    VoiceOption {
        id: "lily",
        name: "Lily",
        english_voice: "en-US-Neural2-F",
        premium_voice: "Aoede",
    },
    VoiceOption {
        id: "emma",
        name: "Emma",
        english_voice: "en-US-Neural2-C",
        premium_voice: "Kore",
    },
    VoiceOption {
        id: "walter",
        name: "Walter",
        english_voice: "en-US-Neural2-D",
        premium_voice: "Charon",
    },
    VoiceOption {
        id: "rose",
        name: "Rose",
        english_voice: "en-US-Neural2-E",
        premium_voice: "Leda",
    },
    VoiceOption {
        id: "george",
        name: "George",
        english_voice: "en-US-Neural2-A",
        premium_voice: "Orus",
    },
    VoiceOption {
        id: "leo",
        name: "Leo",
        english_voice: "en-US-Neural2-I",
        premium_voice: "Puck",
    },
    VoiceOption {
        id: "theo",
        name: "Theo",
        english_voice: "en-US-Neural2-J",
        premium_voice: "Fenrir",
    },
];

/// Look up a narrator by id, falling back to the default narrator for
/// unknown ids so stored stories never fail narration over a catalog edit.
pub fn voice_option(voice_id: &str) -> &'static VoiceOption {
    VOICE_OPTIONS
        .iter()
        .find(|v| v.id == voice_id)
        .unwrap_or(&VOICE_OPTIONS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_parse_is_exact_match_only() {
        assert_eq!(VoiceTier::parse_lenient("premium"), VoiceTier::Premium);
        assert_eq!(VoiceTier::parse_lenient("Premium"), VoiceTier::Standard);
        assert_eq!(VoiceTier::parse_lenient("premium-plus"), VoiceTier::Standard);
        assert_eq!(VoiceTier::parse_lenient(""), VoiceTier::Standard);
    }

    #[test]
    fn unknown_voice_falls_back_to_default() {
        assert_eq!(voice_option("nonexistent").id, DEFAULT_VOICE_ID);
        assert_eq!(voice_option("walter").id, "walter");
    }
}
