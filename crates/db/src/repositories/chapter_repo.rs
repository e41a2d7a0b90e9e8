//! Repository for the `chapters` table.

use sqlx::PgPool;

use lullaby_core::story::ChapterStatus;
use lullaby_core::types::DbId;

use crate::models::chapter::Chapter;

/// Column list for `chapters` queries.
const COLUMNS: &str = "id, story_id, chapter_index, status, created_at";

/// CRUD operations for chapters.
pub struct ChapterRepo;

impl ChapterRepo {
    /// Insert a chapter in `generating` status at the given 1-based index.
    ///
    /// The unique `(story_id, chapter_index)` constraint rejects duplicate
    /// indices if two continuation requests race.
    pub async fn insert(
        pool: &PgPool,
        story_id: DbId,
        chapter_index: i32,
    ) -> Result<Chapter, sqlx::Error> {
        let query = format!(
            "INSERT INTO chapters (story_id, chapter_index, status) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(story_id)
            .bind(chapter_index)
            .bind(ChapterStatus::Generating.as_str())
            .fetch_one(pool)
            .await
    }

    /// All chapters of a story in index order.
    pub async fn list_by_story(
        pool: &PgPool,
        story_id: DbId,
    ) -> Result<Vec<Chapter>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM chapters WHERE story_id = $1 ORDER BY chapter_index");
        sqlx::query_as::<_, Chapter>(&query)
            .bind(story_id)
            .fetch_all(pool)
            .await
    }

    /// Number of chapters the story currently has. The next chapter index is
    /// `count + 1`.
    pub async fn count_by_story(pool: &PgPool, story_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM chapters WHERE story_id = $1")
                .bind(story_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// The first chapter of a story, if any.
    pub async fn first_of_story(
        pool: &PgPool,
        story_id: DbId,
    ) -> Result<Option<Chapter>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM chapters WHERE story_id = $1 \
             ORDER BY chapter_index LIMIT 1"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(story_id)
            .fetch_optional(pool)
            .await
    }

    /// The most recent chapter of a story, if any.
    pub async fn last_of_story(
        pool: &PgPool,
        story_id: DbId,
    ) -> Result<Option<Chapter>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM chapters WHERE story_id = $1 \
             ORDER BY chapter_index DESC LIMIT 1"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(story_id)
            .fetch_optional(pool)
            .await
    }

    /// Transition a chapter to its terminal `done` status.
    pub async fn mark_done(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE chapters SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(ChapterStatus::Done.as_str())
            .execute(pool)
            .await?;
        Ok(())
    }
}
