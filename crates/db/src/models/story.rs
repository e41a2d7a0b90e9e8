//! Story entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lullaby_core::types::{DbId, Timestamp};

/// A row from the `stories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Story {
    pub id: DbId,
    pub user_id: DbId,
    pub title: Option<String>,
    /// Comma-joined tone ids; parse with `lullaby_core::tones::parse_tones`.
    pub tone: String,
    pub length_key: String,
    pub ruleset_id: String,
    pub context_json: serde_json::Value,
    pub status: String,
    pub created_at: Timestamp,
}

/// Insert payload for a new story.
#[derive(Debug, Clone)]
pub struct NewStory {
    pub user_id: DbId,
    pub tone: String,
    pub length_key: String,
    pub ruleset_id: String,
    pub context_json: serde_json::Value,
}

/// Fields updatable after the media phase completes.
#[derive(Debug, Clone, Default)]
pub struct UpdateStory {
    pub title: Option<String>,
    pub context_json: Option<serde_json::Value>,
}

/// Library listing row: the story row's display columns enriched with the
/// cover image pulled from `context_json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryListItem {
    pub id: DbId,
    pub title: Option<String>,
    pub tone: String,
    pub length_key: String,
    pub status: String,
    pub cover_image_url: Option<String>,
    pub created_at: Timestamp,
}

/// Query parameters for `GET /stories`.
#[derive(Debug, Deserialize)]
pub struct StoryListQuery {
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
