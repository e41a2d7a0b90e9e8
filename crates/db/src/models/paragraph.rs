//! Paragraph entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use lullaby_core::types::{DbId, Timestamp};

/// A row from the `paragraphs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Paragraph {
    pub id: DbId,
    pub chapter_id: DbId,
    /// 1-based, dense, matching the generator's output order.
    pub paragraph_index: i32,
    pub text: String,
    pub audio_url: Option<String>,
    pub image_url: Option<String>,
    pub image_prompt: Option<String>,
    pub created_at: Timestamp,
}

/// One row of the batch insert performed per generated chapter.
#[derive(Debug, Clone)]
pub struct NewParagraph {
    pub paragraph_index: i32,
    pub text: String,
    pub audio_url: Option<String>,
}
