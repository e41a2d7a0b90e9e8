//! Story length tiers and lifecycle statuses.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Story length tier, controlling target paragraph count and base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthTier {
    Micro,
    Short,
    Medium,
    Long,
}

impl LengthTier {
    /// All tiers in ascending order of length.
    pub const ALL: [LengthTier; 4] = [
        LengthTier::Micro,
        LengthTier::Short,
        LengthTier::Medium,
        LengthTier::Long,
    ];

    /// The database column value (`length_key`).
    pub fn as_str(self) -> &'static str {
        match self {
            LengthTier::Micro => "micro",
            LengthTier::Short => "short",
            LengthTier::Medium => "medium",
            LengthTier::Long => "long",
        }
    }

    /// Parse a stored `length_key` value. Unknown values are a validation
    /// error rather than a silent default; the column is written only from
    /// this enum.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "micro" => Ok(LengthTier::Micro),
            "short" => Ok(LengthTier::Short),
            "medium" => Ok(LengthTier::Medium),
            "long" => Ok(LengthTier::Long),
            other => Err(CoreError::Validation(format!(
                "Unknown length tier '{other}'. Must be one of: micro, short, medium, long"
            ))),
        }
    }

    /// Zero-based position used to index per-tier tables.
    pub fn index(self) -> usize {
        match self {
            LengthTier::Micro => 0,
            LengthTier::Short => 1,
            LengthTier::Medium => 2,
            LengthTier::Long => 3,
        }
    }
}

/// Story lifecycle status (`stories.status`).
///
/// `Generating` covers the window between first-chapter text persistence and
/// the completion of the deferred media phase; clients poll until `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryStatus {
    Generating,
    Done,
}

impl StoryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StoryStatus::Generating => "generating",
            StoryStatus::Done => "done",
        }
    }

    pub fn is_done(value: &str) -> bool {
        value == StoryStatus::Done.as_str()
    }
}

/// Chapter lifecycle status (`chapters.status`).
///
/// A chapter becomes `Done` only after all its paragraphs exist and every
/// voice/image synthesis attempt has been resolved (attempted, not
/// necessarily succeeded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterStatus {
    Generating,
    Done,
}

impl ChapterStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ChapterStatus::Generating => "generating",
            ChapterStatus::Done => "done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_tier_round_trips_through_column_value() {
        for tier in LengthTier::ALL {
            assert_eq!(LengthTier::parse(tier.as_str()).unwrap(), tier);
        }
    }

    #[test]
    fn length_tier_rejects_unknown_value() {
        assert!(LengthTier::parse("epic").is_err());
    }

    #[test]
    fn tier_indices_are_ascending() {
        let indices: Vec<usize> = LengthTier::ALL.iter().map(|t| t.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn status_strings_match_schema_enum() {
        assert_eq!(StoryStatus::Generating.as_str(), "generating");
        assert_eq!(StoryStatus::Done.as_str(), "done");
        assert!(StoryStatus::is_done("done"));
        assert!(!StoryStatus::is_done("generating"));
    }
}
