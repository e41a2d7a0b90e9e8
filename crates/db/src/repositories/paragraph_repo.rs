//! Repository for the `paragraphs` table.

use sqlx::PgPool;

use lullaby_core::types::DbId;

use crate::models::paragraph::{NewParagraph, Paragraph};

/// Column list for `paragraphs` queries.
const COLUMNS: &str =
    "id, chapter_id, paragraph_index, text, audio_url, image_url, image_prompt, created_at";

/// CRUD operations for paragraphs.
pub struct ParagraphRepo;

impl ParagraphRepo {
    /// Batch-insert a chapter's paragraphs in one statement.
    ///
    /// The generator's output order *is* the canonical paragraph order;
    /// callers assign dense 1-based indices before handing rows here.
    pub async fn insert_batch(
        pool: &PgPool,
        chapter_id: DbId,
        paragraphs: &[NewParagraph],
    ) -> Result<(), sqlx::Error> {
        if paragraphs.is_empty() {
            return Ok(());
        }

        let mut builder = sqlx::QueryBuilder::new(
            "INSERT INTO paragraphs (chapter_id, paragraph_index, text, audio_url) ",
        );
        builder.push_values(paragraphs, |mut row, p| {
            row.push_bind(chapter_id)
                .push_bind(p.paragraph_index)
                .push_bind(&p.text)
                .push_bind(&p.audio_url);
        });
        builder.build().execute(pool).await?;
        Ok(())
    }

    /// A chapter's paragraphs in index order.
    pub async fn list_by_chapter(
        pool: &PgPool,
        chapter_id: DbId,
    ) -> Result<Vec<Paragraph>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM paragraphs WHERE chapter_id = $1 ORDER BY paragraph_index"
        );
        sqlx::query_as::<_, Paragraph>(&query)
            .bind(chapter_id)
            .fetch_all(pool)
            .await
    }

    /// Set a paragraph's audio URL, keyed by `(chapter_id, paragraph_index)`
    /// so out-of-order completion of concurrent synthesis tasks is safe.
    pub async fn set_audio(
        pool: &PgPool,
        chapter_id: DbId,
        paragraph_index: i32,
        audio_url: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE paragraphs SET audio_url = $3 \
             WHERE chapter_id = $1 AND paragraph_index = $2",
        )
        .bind(chapter_id)
        .bind(paragraph_index)
        .bind(audio_url)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Set a paragraph's image URL and the prompt that produced it.
    pub async fn set_image(
        pool: &PgPool,
        chapter_id: DbId,
        paragraph_index: i32,
        image_url: &str,
        image_prompt: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE paragraphs SET image_url = $3, image_prompt = $4 \
             WHERE chapter_id = $1 AND paragraph_index = $2",
        )
        .bind(chapter_id)
        .bind(paragraph_index)
        .bind(image_url)
        .bind(image_prompt)
        .execute(pool)
        .await?;
        Ok(())
    }
}
