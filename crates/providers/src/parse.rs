//! Parsing and validation of untrusted generation output.
//!
//! Paragraph output is held to a strict contract: after unwrapping an
//! optional markdown code fence, the payload must be a pure JSON array of
//! strings. Title/summary output, in contrast, degrades gracefully to
//! fallbacks derived from the opening paragraph.

use crate::error::{ProviderError, ProviderResult};

/// Cap applied to parsed titles.
const TITLE_MAX_CHARS: usize = 100;
/// Cap applied to parsed summaries.
const SUMMARY_MAX_CHARS: usize = 150;
/// Cap applied to the fallback title taken from the opening sentence.
const FALLBACK_TITLE_MAX_CHARS: usize = 50;
/// Cap applied to the fallback summary prefix.
const FALLBACK_SUMMARY_MAX_CHARS: usize = 80;

/// Title used when even the fallback derivation has nothing to work with.
const UNTITLED: &str = "Untitled Story";

/// A story title and one-to-two sentence summary.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleSummary {
    pub title: String,
    pub summary: String,
}

/// Strip a single leading/trailing markdown code fence (with optional
/// language marker) from a provider response. Anything else passes through
/// untouched.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language marker (e.g. "json") up to the first newline.
    let body = match rest.split_once('\n') {
        Some((_marker, body)) => body,
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse paragraph output: must be a JSON array of strings, nothing else.
///
/// A fenced payload is unwrapped first; any other deviation from "pure JSON
/// array of strings" is a [`ProviderError::MalformedOutput`].
pub fn parse_paragraph_array(raw: &str) -> ProviderResult<Vec<String>> {
    let content = strip_code_fence(raw);

    let value: serde_json::Value = serde_json::from_str(content).map_err(|_| {
        ProviderError::MalformedOutput(format!(
            "not parseable as JSON array. Got: {}",
            preview(content, 200)
        ))
    })?;

    let Some(items) = value.as_array() else {
        return Err(ProviderError::MalformedOutput(
            "JSON value is not an array".to_string(),
        ));
    };

    let mut paragraphs = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some(s) => paragraphs.push(s.to_string()),
            None => {
                return Err(ProviderError::MalformedOutput(
                    "array contains a non-string element".to_string(),
                ))
            }
        }
    }
    Ok(paragraphs)
}

/// Parse title/summary output. Returns `None` on any shape violation; the
/// caller substitutes [`fallback_title_summary`].
pub fn parse_title_summary(raw: &str) -> Option<TitleSummary> {
    let content = strip_code_fence(raw);
    let value: serde_json::Value = serde_json::from_str(content).ok()?;
    let title = value.get("title")?.as_str()?.trim();
    let summary = value.get("summary")?.as_str()?.trim();
    if title.is_empty() {
        return None;
    }
    Some(TitleSummary {
        title: truncate_chars(title, TITLE_MAX_CHARS),
        summary: truncate_chars(summary, SUMMARY_MAX_CHARS),
    })
}

/// Derive a title and summary from the opening paragraph when the provider's
/// output was unusable: first sentence as title, truncated prefix as
/// summary. Never fails.
pub fn fallback_title_summary(first_paragraph: &str) -> TitleSummary {
    let first_sentence = first_paragraph
        .split_inclusive(['.', '!', '?'])
        .next()
        .map(|s| s.trim_end_matches(['.', '!', '?']).trim())
        .unwrap_or("");

    let title = if first_sentence.is_empty() {
        UNTITLED.to_string()
    } else {
        truncate_chars(first_sentence, FALLBACK_TITLE_MAX_CHARS)
    };

    TitleSummary {
        title,
        summary: truncate_chars(first_paragraph.trim(), FALLBACK_SUMMARY_MAX_CHARS),
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

fn preview(s: &str, max_chars: usize) -> String {
    truncate_chars(s, max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn plain_json_array_parses() {
        let paragraphs = parse_paragraph_array(r#"["one", "two", "three"]"#).unwrap();
        assert_eq!(paragraphs, vec!["one", "two", "three"]);
    }

    #[test]
    fn fenced_json_array_is_unwrapped() {
        let raw = "```json\n[\"first\", \"second\"]\n```";
        let paragraphs = parse_paragraph_array(raw).unwrap();
        assert_eq!(paragraphs, vec!["first", "second"]);
    }

    #[test]
    fn fence_without_language_marker_is_unwrapped() {
        let raw = "```\n[\"only\"]\n```";
        assert_eq!(parse_paragraph_array(raw).unwrap(), vec!["only"]);
    }

    #[test]
    fn prose_around_json_is_a_hard_failure() {
        let raw = "Here is your story:\n[\"one\"]";
        assert_matches!(
            parse_paragraph_array(raw),
            Err(ProviderError::MalformedOutput(_))
        );
    }

    #[test]
    fn non_array_json_is_a_hard_failure() {
        assert_matches!(
            parse_paragraph_array(r#"{"paragraphs": ["one"]}"#),
            Err(ProviderError::MalformedOutput(_))
        );
    }

    #[test]
    fn array_with_non_string_element_is_a_hard_failure() {
        assert_matches!(
            parse_paragraph_array(r#"["one", 2]"#),
            Err(ProviderError::MalformedOutput(_))
        );
    }

    #[test]
    fn empty_array_is_valid_shape() {
        assert!(parse_paragraph_array("[]").unwrap().is_empty());
    }

    #[test]
    fn title_summary_parses_and_is_capped() {
        let raw = format!(
            r#"{{"title": "{}", "summary": "A short tale."}}"#,
            "t".repeat(150)
        );
        let parsed = parse_title_summary(&raw).unwrap();
        assert_eq!(parsed.title.chars().count(), 100);
        assert_eq!(parsed.summary, "A short tale.");
    }

    #[test]
    fn title_summary_shape_violations_return_none() {
        assert!(parse_title_summary("not json").is_none());
        assert!(parse_title_summary(r#"{"title": 5, "summary": "x"}"#).is_none());
        assert!(parse_title_summary(r#"{"summary": "x"}"#).is_none());
        assert!(parse_title_summary(r#"{"title": "", "summary": "x"}"#).is_none());
    }

    #[test]
    fn fallback_uses_first_sentence_as_title() {
        let fallback =
            fallback_title_summary("Milo the mouse found a lantern. It glowed softly.");
        assert_eq!(fallback.title, "Milo the mouse found a lantern");
        assert!(fallback.summary.starts_with("Milo the mouse"));
        assert!(fallback.summary.chars().count() <= 80);
    }

    #[test]
    fn fallback_on_empty_paragraph_is_untitled() {
        let fallback = fallback_title_summary("");
        assert_eq!(fallback.title, "Untitled Story");
        assert_eq!(fallback.summary, "");
    }

    #[test]
    fn fallback_title_is_bounded() {
        let long = format!("{} and on it went. More.", "word ".repeat(30));
        let fallback = fallback_title_summary(&long);
        assert!(fallback.title.chars().count() <= 50);
    }
}
