//! Chapter entity model.

use serde::Serialize;
use sqlx::FromRow;

use lullaby_core::types::{DbId, Timestamp};

/// A row from the `chapters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Chapter {
    pub id: DbId,
    pub story_id: DbId,
    /// 1-based, monotonic, no gaps; assigned as `previous count + 1`.
    pub chapter_index: i32,
    pub status: String,
    pub created_at: Timestamp,
}
