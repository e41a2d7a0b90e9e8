//! Tone selection: parsing, storage serialization, and style-hint
//! compilation.
//!
//! The `stories.tone` column is a comma-joined text value; selection order is
//! preserved because later chapters rebuild their prompts from it.

/// Tone applied when the caller selects none.
pub const DEFAULT_TONE: &str = "cozy";

/// Tone id that requests educational content woven into the narrative.
pub const INFORMATIONAL_TONE: &str = "informatical";

/// All selectable tone ids, in create-form order.
pub const TONE_IDS: [&str; 4] = ["cozy", "funny", "adventurous", INFORMATIONAL_TONE];

/// Normalize a tone selection: trim, drop empties and duplicates, preserve
/// first-seen order, and default to [`DEFAULT_TONE`] when nothing survives.
pub fn normalize_tones(tones: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tone in tones {
        let t = tone.trim();
        if t.is_empty() || out.iter().any(|seen| seen == t) {
            continue;
        }
        out.push(t.to_string());
    }
    if out.is_empty() {
        out.push(DEFAULT_TONE.to_string());
    }
    out
}

/// Serialize a tone selection for the `stories.tone` column.
pub fn serialize_tones(tones: &[String]) -> String {
    normalize_tones(tones).join(",")
}

/// Parse the stored `stories.tone` column back into the ordered selection.
pub fn parse_tones(stored: &str) -> Vec<String> {
    let tones: Vec<String> = stored
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    normalize_tones(&tones)
}

/// Render tones for display and prompts, e.g. `"Cozy + Adventurous"`.
pub fn format_tone_label(tones: &[String]) -> String {
    normalize_tones(tones)
        .iter()
        .map(|t| capitalize(t))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Whether the informational tone is among the selection.
pub fn has_informational(tones: &[String]) -> bool {
    tones.iter().any(|t| t == INFORMATIONAL_TONE)
}

/// Compile the style hint injected into the generation prompt.
///
/// `facts_only` replaces narrative generation entirely: topics are extracted
/// from the user input and rendered as accurate, kid-safe facts with no plot.
/// Otherwise the hint combines the bedtime-safe baseline with the tone label,
/// plus a fact-interleaving instruction when the informational tone is
/// selected.
pub fn compile_style_hint(tones: &[String], facts_only: bool) -> String {
    if facts_only {
        return "Facts mode: do not write a narrative story. Extract the topics from the \
                user input and present accurate, kid-safe facts about each topic in simple \
                language. No plot, no invented characters."
            .to_string();
    }

    let label = format_tone_label(tones);
    let mut hint = format!(
        "Tone: {label}. Bedtime-safe, calm pacing, simple language, gentle conflict, \
         soothing ending."
    );
    if has_informational(tones) {
        hint.push_str(
            " Weave true, age-appropriate educational facts into the story so the reader \
             learns something real along the way.",
        );
    }
    hint
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tones(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_selection_defaults_to_cozy() {
        assert_eq!(normalize_tones(&[]), vec!["cozy"]);
        assert_eq!(parse_tones(""), vec!["cozy"]);
        assert_eq!(serialize_tones(&[]), "cozy");
    }

    #[test]
    fn normalization_preserves_order_and_drops_duplicates() {
        let input = tones(&["adventurous", "cozy", "adventurous", " funny "]);
        assert_eq!(
            normalize_tones(&input),
            vec!["adventurous", "cozy", "funny"]
        );
    }

    #[test]
    fn storage_round_trip_keeps_order() {
        let input = tones(&["informatical", "cozy"]);
        let stored = serialize_tones(&input);
        assert_eq!(stored, "informatical,cozy");
        assert_eq!(parse_tones(&stored), vec!["informatical", "cozy"]);
    }

    #[test]
    fn label_is_plus_joined_and_capitalized() {
        let input = tones(&["cozy", "adventurous"]);
        assert_eq!(format_tone_label(&input), "Cozy + Adventurous");
    }

    #[test]
    fn style_hint_includes_tone_and_baseline() {
        let hint = compile_style_hint(&tones(&["funny"]), false);
        assert!(hint.contains("Tone: Funny."));
        assert!(hint.contains("Bedtime-safe"));
        assert!(!hint.contains("educational facts"));
    }

    #[test]
    fn informational_tone_adds_fact_instruction() {
        let hint = compile_style_hint(&tones(&["cozy", "informatical"]), false);
        assert!(hint.contains("educational facts"));
    }

    #[test]
    fn facts_only_overrides_narrative_hint() {
        let hint = compile_style_hint(&tones(&["informatical"]), true);
        assert!(hint.contains("Facts mode"));
        assert!(hint.contains("No plot"));
        assert!(!hint.contains("Tone:"));
    }
}
