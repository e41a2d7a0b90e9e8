//! Language options for story generation and narration.

/// A supported story language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageOption {
    /// Stable id stored in the story context (`"en"`, `"sv"`, `"es"`).
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Name used inside generation prompts ("Write the story in ...").
    pub prompt_name: &'static str,
    /// BCP-47 code passed to the speech synthesizer.
    pub speech_code: &'static str,
}

pub const LANGUAGE_OPTIONS: [LanguageOption; 3] = [
    LanguageOption {
        id: "en",
        name: "English",
        prompt_name: "English",
        speech_code: "en-US",
    },
    LanguageOption {
        id: "sv",
        name: "Swedish",
        prompt_name: "Swedish",
        speech_code: "sv-SE",
    },
    LanguageOption {
        id: "es",
        name: "Spanish",
        prompt_name: "Spanish",
        speech_code: "es-ES",
    },
];

/// Look up a language by id. Unknown ids fall back to English.
pub fn language_option(language_id: &str) -> &'static LanguageOption {
    LANGUAGE_OPTIONS
        .iter()
        .find(|l| l.id == language_id)
        .unwrap_or(&LANGUAGE_OPTIONS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_language_resolves() {
        assert_eq!(language_option("sv").prompt_name, "Swedish");
        assert_eq!(language_option("es").speech_code, "es-ES");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        assert_eq!(language_option("fr").id, "en");
        assert_eq!(language_option("").id, "en");
    }
}
