//! Story spec assembly and the generation prompt builder.

use serde::{Deserialize, Serialize};

use crate::language::language_option;
use crate::ruleset::{global_instructions, load_ruleset};
use crate::story::LengthTier;
use crate::tags::build_tag_directives_block;
use crate::tones::{compile_style_hint, normalize_tones};

/// Recap window: the last this-many characters of the previous chapter's
/// text are carried into the next prompt, so the freshest context wins.
pub const RECAP_MAX_CHARS: usize = 1200;

/// Upper bound on the one-off per-chapter direction input.
pub const DIRECTION_MAX_CHARS: usize = 500;

/// Paragraph length bounds stated in every prompt.
const MIN_SENTENCES_PER_PARAGRAPH: u32 = 2;
const MAX_SENTENCES_PER_PARAGRAPH: u32 = 5;

/// Inputs gathered from a story-creation request (or reconstructed from a
/// stored story context for continuations).
#[derive(Debug, Clone)]
pub struct SpecInput {
    pub user_input: String,
    pub tags: Vec<String>,
    pub tones: Vec<String>,
    pub length: LengthTier,
    pub ruleset_id: String,
    pub story_rules: String,
    pub language: String,
    pub facts_only: bool,
}

/// Everything the prompt builder needs, computed once per chapter request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorySpec {
    pub tones: Vec<String>,
    pub length: LengthTier,
    pub paragraph_count: u32,
    pub rules_version: u32,
    pub user_input: String,
    pub tags: Vec<String>,
    pub tag_directives: String,
    pub style_hint: String,
    pub story_rules: String,
    pub global_instructions: String,
    /// Prompt-facing language name, e.g. `"Swedish"`.
    pub language: String,
    pub facts_only: bool,
}

/// Resolve a [`SpecInput`] into a [`StorySpec`]: ruleset lookup, tone
/// normalization, directive compilation, and language resolution.
pub fn build_story_spec(input: &SpecInput) -> StorySpec {
    let rules = load_ruleset(&input.ruleset_id);
    let tones = normalize_tones(&input.tones);
    let language = language_option(&input.language);

    StorySpec {
        paragraph_count: rules.paragraph_count(input.length),
        rules_version: rules.version,
        tag_directives: build_tag_directives_block(&input.tags),
        style_hint: compile_style_hint(&tones, input.facts_only),
        tones,
        length: input.length,
        user_input: input.user_input.clone(),
        tags: input.tags.clone(),
        story_rules: input.story_rules.clone(),
        global_instructions: global_instructions().to_string(),
        language: language.prompt_name.to_string(),
        facts_only: input.facts_only,
    }
}

/// Build the full generation prompt for one chapter.
///
/// Sections are concatenated in fixed order; empty optional sections are
/// omitted entirely, never emitted as an empty heading. The closing format
/// instructions require a pure JSON array of paragraph strings.
pub fn build_generation_prompt(
    spec: &StorySpec,
    chapter_index: u32,
    recap: Option<&str>,
    direction: Option<&str>,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    if spec.facts_only {
        lines.push("Write a kid-friendly facts chapter (no fictional story).".to_string());
    } else {
        lines.push("Write a bedtime story chapter.".to_string());
    }
    lines.push(format!("Write everything in {}.", spec.language));
    lines.push(format!("Chapter index: {chapter_index}"));

    if let Some(recap) = recap.filter(|r| !r.is_empty()) {
        lines.push(format!("Recap so far: {recap}"));
    }
    lines.push(format!("User input: {}", spec.user_input));
    if let Some(direction) = direction.map(str::trim).filter(|d| !d.is_empty()) {
        lines.push(format!("Direction for this chapter: {direction}"));
    }
    if !spec.tag_directives.is_empty() {
        lines.push(format!(
            "Mandatory content directives:\n{}",
            spec.tag_directives
        ));
    }
    lines.push(format!("Style: {}", spec.style_hint));
    if !spec.global_instructions.is_empty() {
        lines.push(format!("Global rules:\n{}", spec.global_instructions));
    }
    if !spec.story_rules.is_empty() {
        lines.push(format!("Story rules (user):\n{}", spec.story_rules));
    }

    lines.push(format!("Output exactly {} paragraphs.", spec.paragraph_count));
    lines.push(format!(
        "Each paragraph should be {MIN_SENTENCES_PER_PARAGRAPH}-{MAX_SENTENCES_PER_PARAGRAPH} sentences."
    ));
    if spec.facts_only {
        lines.push("Keep every fact accurate and kid-safe.".to_string());
    } else {
        lines.push("Keep it kid-safe. End the final paragraph calm and sleepy.".to_string());
    }
    lines.push("Return a JSON array of strings. No extra text.".to_string());

    lines.join("\n")
}

/// Tail-truncate previous-chapter text into a recap window: the *last*
/// [`RECAP_MAX_CHARS`] characters, so the most recent events are retained.
pub fn tail_recap(previous_chapter_text: &str) -> String {
    tail_chars(previous_chapter_text, RECAP_MAX_CHARS)
}

/// Trim and bound the one-off continuation direction input.
pub fn clamp_direction(direction: &str) -> String {
    direction.trim().chars().take(DIRECTION_MAX_CHARS).collect()
}

/// The last `max_chars` characters of `text` (char-boundary safe).
fn tail_chars(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }
    text.chars().skip(total - max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> StorySpec {
        build_story_spec(&SpecInput {
            user_input: "a fox who loses a mitten".to_string(),
            tags: vec!["animals".to_string(), "forest".to_string()],
            tones: vec!["cozy".to_string()],
            length: LengthTier::Short,
            ruleset_id: "default".to_string(),
            story_rules: String::new(),
            language: "en".to_string(),
            facts_only: false,
        })
    }

    #[test]
    fn narrative_prompt_has_fixed_section_order() {
        let prompt = build_generation_prompt(&spec(), 1, None, None);
        let framing = prompt.find("Write a bedtime story chapter.").unwrap();
        let language = prompt.find("Write everything in English.").unwrap();
        let chapter = prompt.find("Chapter index: 1").unwrap();
        let input = prompt.find("User input: a fox").unwrap();
        let directives = prompt.find("Mandatory content directives:").unwrap();
        let style = prompt.find("Style: Tone: Cozy.").unwrap();
        let count = prompt.find("Output exactly 5 paragraphs.").unwrap();
        let format = prompt.find("Return a JSON array of strings.").unwrap();
        let mut order = [framing, language, chapter, input, directives, style, count, format];
        let sorted = order;
        order.sort_unstable();
        assert_eq!(order, sorted, "sections out of order");
    }

    #[test]
    fn empty_optional_sections_are_omitted() {
        let mut s = spec();
        s.tags.clear();
        s.tag_directives.clear();
        let prompt = build_generation_prompt(&s, 1, None, None);
        assert!(!prompt.contains("Recap so far:"));
        assert!(!prompt.contains("Direction for this chapter:"));
        assert!(!prompt.contains("Mandatory content directives:"));
        assert!(!prompt.contains("Story rules (user):"));
    }

    #[test]
    fn recap_and_direction_appear_when_present() {
        let prompt =
            build_generation_prompt(&spec(), 2, Some("the fox found a clue"), Some("add an owl"));
        assert!(prompt.contains("Recap so far: the fox found a clue"));
        assert!(prompt.contains("Direction for this chapter: add an owl"));
        assert!(prompt.contains("Chapter index: 2"));
    }

    #[test]
    fn facts_only_prompt_swaps_framing_and_closing() {
        let mut input = SpecInput {
            user_input: "volcanoes and penguins".to_string(),
            tags: vec![],
            tones: vec!["informatical".to_string()],
            length: LengthTier::Micro,
            ruleset_id: "default".to_string(),
            story_rules: String::new(),
            language: "en".to_string(),
            facts_only: true,
        };
        let s = build_story_spec(&input);
        let prompt = build_generation_prompt(&s, 1, None, None);
        assert!(prompt.contains("facts chapter"));
        assert!(prompt.contains("Facts mode"));
        assert!(!prompt.contains("calm and sleepy"));

        input.facts_only = false;
        let s = build_story_spec(&input);
        let prompt = build_generation_prompt(&s, 1, None, None);
        assert!(prompt.contains("calm and sleepy"));
    }

    #[test]
    fn recap_keeps_the_tail_not_the_head() {
        let text = format!("{}{}", "x".repeat(2000), "THE END IS HERE");
        let recap = tail_recap(&text);
        assert_eq!(recap.chars().count(), RECAP_MAX_CHARS);
        assert!(recap.ends_with("THE END IS HERE"));
    }

    #[test]
    fn short_recap_passes_through_unchanged() {
        assert_eq!(tail_recap("a short chapter"), "a short chapter");
    }

    #[test]
    fn direction_is_trimmed_and_bounded() {
        let long = format!("  {}  ", "d".repeat(600));
        let clamped = clamp_direction(&long);
        assert_eq!(clamped.chars().count(), DIRECTION_MAX_CHARS);
        assert!(clamped.starts_with('d'));
    }

    #[test]
    fn spec_resolves_paragraph_count_from_ruleset() {
        let s = spec();
        assert_eq!(s.paragraph_count, 5);
        assert_eq!(s.rules_version, 1);
        assert!(s.tag_directives.contains("ANIMALS:"));
    }
}
