//! Repository for the `stories` table.

use sqlx::PgPool;

use lullaby_core::story::StoryStatus;
use lullaby_core::types::DbId;

use crate::models::story::{NewStory, Story, StoryListQuery, UpdateStory};

/// Column list for `stories` queries.
const COLUMNS: &str =
    "id, user_id, title, tone, length_key, ruleset_id, context_json, status, created_at";

/// Maximum page size for story listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for story listing.
const DEFAULT_LIMIT: i64 = 50;

/// CRUD operations for stories.
pub struct StoryRepo;

impl StoryRepo {
    /// Insert a new story in `generating` status and return the row.
    pub async fn insert(pool: &PgPool, input: &NewStory) -> Result<Story, sqlx::Error> {
        let query = format!(
            "INSERT INTO stories (user_id, tone, length_key, ruleset_id, context_json, status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Story>(&query)
            .bind(input.user_id)
            .bind(&input.tone)
            .bind(&input.length_key)
            .bind(&input.ruleset_id)
            .bind(&input.context_json)
            .bind(StoryStatus::Generating.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a story by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Story>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stories WHERE id = $1");
        sqlx::query_as::<_, Story>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a story by id, restricted to its owner. Returns `None` both for
    /// missing stories and for stories owned by someone else.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Story>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stories WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Story>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's stories with their context blobs, newest first (the
    /// library view needs `coverImageUrl` out of the context).
    pub async fn list_by_user_with_context(
        pool: &PgPool,
        user_id: DbId,
        params: &StoryListQuery,
    ) -> Result<Vec<Story>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);
        let query = format!(
            "SELECT {COLUMNS} FROM stories WHERE user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Story>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply post-media updates (title and/or context blob).
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        updates: &UpdateStory,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE stories SET \
                 title = COALESCE($2, title), \
                 context_json = COALESCE($3, context_json) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&updates.title)
        .bind(&updates.context_json)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Replace the story's context blob.
    pub async fn set_context(
        pool: &PgPool,
        id: DbId,
        context_json: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE stories SET context_json = $2 WHERE id = $1")
            .bind(id)
            .bind(context_json)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Transition the story to its terminal `done` status.
    pub async fn mark_done(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE stories SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(StoryStatus::Done.as_str())
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Hard-delete a story owned by the caller. Chapters and paragraphs
    /// cascade via foreign keys. Returns `true` if a row was deleted.
    pub async fn delete_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM stories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
