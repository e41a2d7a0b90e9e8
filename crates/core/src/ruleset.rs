//! Versioned generation rulesets and the global writing instructions.

use std::path::Path;
use std::sync::OnceLock;

use crate::story::LengthTier;

/// Paragraph counts per length tier for the default ruleset.
const DEFAULT_PARAGRAPH_COUNTS: [u32; 4] = [3, 5, 8, 12];

/// A versioned set of generation rules.
///
/// Ruleset selection is advisory: unknown ids fall back to the default
/// ruleset rather than failing.
#[derive(Debug, Clone, Copy)]
pub struct Ruleset {
    pub id: &'static str,
    pub version: u32,
    /// Target paragraph count indexed by [`LengthTier::index`].
    paragraph_count_by_length: [u32; 4],
}

impl Ruleset {
    /// Target paragraph count for a length tier.
    pub fn paragraph_count(&self, length: LengthTier) -> u32 {
        self.paragraph_count_by_length[length.index()]
    }
}

const DEFAULT_RULESET: Ruleset = Ruleset {
    id: "default",
    version: 1,
    paragraph_count_by_length: DEFAULT_PARAGRAPH_COUNTS,
};

/// Load a ruleset by id. Unknown ids return the default ruleset.
pub fn load_ruleset(ruleset_id: &str) -> Ruleset {
    match ruleset_id {
        "default" => DEFAULT_RULESET,
        _ => DEFAULT_RULESET,
    }
}

/// Path the global instructions are read from, relative to the working
/// directory, unless `LULLABY_INSTRUCTIONS_PATH` overrides it.
const INSTRUCTIONS_PATH: &str = "rulesets/instructions.md";

static INSTRUCTIONS: OnceLock<String> = OnceLock::new();

/// Global writing instructions injected into every generation prompt.
///
/// Read from disk once per process and cached; a missing or unreadable file
/// yields an empty string (the prompt builder omits empty sections).
pub fn global_instructions() -> &'static str {
    INSTRUCTIONS.get_or_init(|| {
        let path = std::env::var("LULLABY_INSTRUCTIONS_PATH")
            .unwrap_or_else(|_| INSTRUCTIONS_PATH.to_string());
        match std::fs::read_to_string(Path::new(&path)) {
            Ok(contents) => contents,
            Err(_) => String::new(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ruleset_counts_scale_with_length() {
        let rules = load_ruleset("default");
        assert_eq!(rules.paragraph_count(LengthTier::Micro), 3);
        assert_eq!(rules.paragraph_count(LengthTier::Short), 5);
        assert_eq!(rules.paragraph_count(LengthTier::Medium), 8);
        assert_eq!(rules.paragraph_count(LengthTier::Long), 12);
    }

    #[test]
    fn unknown_ruleset_falls_back_to_default() {
        let rules = load_ruleset("experimental-v9");
        assert_eq!(rules.id, "default");
        assert_eq!(rules.version, 1);
    }
}
