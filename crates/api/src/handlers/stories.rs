//! Handlers for story creation, continuation, media generation, retrieval,
//! listing, and deletion.
//!
//! Routes:
//! - `POST   /stories`                     -- create story + first chapter
//! - `GET    /stories`                     -- list the caller's stories
//! - `GET    /stories/{id}`                -- full story with chapters/paragraphs
//! - `DELETE /stories/{id}`                -- owner-checked hard delete
//! - `POST   /stories/{id}/continue`       -- append a chapter
//! - `POST   /stories/{id}/generate-media` -- idempotent deferred media phase

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use lullaby_core::context::StoryContext;
use lullaby_core::error::CoreError;
use lullaby_core::story::LengthTier;
use lullaby_core::types::{DbId, Timestamp};
use lullaby_core::voices::{VoiceTier, DEFAULT_VOICE_ID};
use lullaby_db::models::story::{StoryListItem, StoryListQuery};
use lullaby_db::repositories::{ChapterRepo, ParagraphRepo, StoryRepo};
use lullaby_events::StoryEvent;
use lullaby_pipeline::orchestrator::CreateStoryInput;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Body of `POST /stories`. Every field is optional; defaults match the
/// create form's initial state.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateStoryRequest {
    pub tones: Vec<String>,
    pub length_key: Option<String>,
    pub ruleset_id: Option<String>,
    pub user_input: Option<String>,
    pub tags: Vec<String>,
    pub story_rules: Option<String>,
    pub voice_id: Option<String>,
    /// Anything other than exactly `"premium"` means standard.
    pub voice_tier: Option<String>,
    pub language: Option<String>,
    pub include_images: Option<bool>,
    pub include_voice: Option<bool>,
    pub facts_only: Option<bool>,
}

/// Body of `POST /stories/{id}/continue`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ContinueStoryRequest {
    /// Optional one-off nudge for this chapter only.
    #[validate(length(max = 500, message = "directionInput must be at most 500 characters"))]
    pub direction_input: Option<String>,
}

/// POST /api/v1/stories
///
/// Prices the first chapter, gates on balance, generates the text, persists
/// the story, and returns immediately; the client triggers
/// `generate-media` next and polls story status until `done`.
pub async fn create_story(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateStoryRequest>,
) -> AppResult<impl IntoResponse> {
    let length = LengthTier::parse(input.length_key.as_deref().unwrap_or("short"))
        .map_err(AppError::Core)?;

    let created = state
        .orchestrator
        .create_story(
            user.user_id,
            CreateStoryInput {
                tones: input.tones,
                length,
                ruleset_id: input.ruleset_id.unwrap_or_else(|| "default".to_string()),
                user_input: input.user_input.unwrap_or_default(),
                tags: input.tags,
                story_rules: input.story_rules.unwrap_or_default(),
                voice_id: input
                    .voice_id
                    .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
                voice_tier: VoiceTier::parse_lenient(input.voice_tier.as_deref().unwrap_or("")),
                language: input.language.unwrap_or_else(|| "en".to_string()),
                include_images: input.include_images.unwrap_or(true),
                include_voice: input.include_voice.unwrap_or(true),
                facts_only: input.facts_only.unwrap_or(false),
            },
        )
        .await?;

    Ok(Json(created))
}

/// POST /api/v1/stories/{id}/continue
pub async fn continue_story(
    State(state): State<AppState>,
    user: AuthUser,
    Path(story_id): Path<DbId>,
    body: Option<Json<ContinueStoryRequest>>,
) -> AppResult<impl IntoResponse> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let continued = state
        .orchestrator
        .continue_story(user.user_id, story_id, input.direction_input)
        .await?;

    Ok(Json(continued))
}

/// POST /api/v1/stories/{id}/generate-media
///
/// Safe to invoke repeatedly: once the story is `done` this is a no-op.
pub async fn generate_media(
    State(state): State<AppState>,
    user: AuthUser,
    Path(story_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .orchestrator
        .generate_media(user.user_id, story_id)
        .await?;
    Ok(Json(outcome))
}

/// A paragraph in the story detail response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphDetail {
    pub id: DbId,
    pub paragraph_index: i32,
    pub text: String,
    pub audio_url: Option<String>,
    pub image_url: Option<String>,
}

/// A chapter in the story detail response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDetail {
    pub id: DbId,
    pub chapter_index: i32,
    pub status: String,
    pub paragraphs: Vec<ParagraphDetail>,
}

/// Full story payload for `GET /stories/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDetail {
    pub id: DbId,
    pub title: Option<String>,
    pub tone: String,
    pub length_key: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_warning: Option<String>,
    pub chapters: Vec<ChapterDetail>,
    pub created_at: Timestamp,
}

/// GET /api/v1/stories/{id}
///
/// Owner-checked; a story owned by someone else reads as not found.
pub async fn get_story(
    State(state): State<AppState>,
    user: AuthUser,
    Path(story_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let story = StoryRepo::find_owned(&state.pool, story_id, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Story",
            id: story_id,
        }))?;

    let context: StoryContext =
        serde_json::from_value(story.context_json.clone()).unwrap_or_default();

    let mut chapters = Vec::new();
    for chapter in ChapterRepo::list_by_story(&state.pool, story.id).await? {
        let paragraphs = ParagraphRepo::list_by_chapter(&state.pool, chapter.id)
            .await?
            .into_iter()
            .map(|p| ParagraphDetail {
                id: p.id,
                paragraph_index: p.paragraph_index,
                text: p.text,
                audio_url: p.audio_url,
                image_url: p.image_url,
            })
            .collect();
        chapters.push(ChapterDetail {
            id: chapter.id,
            chapter_index: chapter.chapter_index,
            status: chapter.status,
            paragraphs,
        });
    }

    Ok(Json(StoryDetail {
        id: story.id,
        title: story.title,
        tone: story.tone,
        length_key: story.length_key,
        status: story.status,
        summary: context.summary,
        cover_image_url: context.cover_image_url,
        voice_warning: context.voice_warning,
        chapters,
        created_at: story.created_at,
    }))
}

/// GET /api/v1/stories
///
/// The caller's library, newest first, with cover images pulled out of each
/// story's context.
pub async fn list_stories(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<StoryListQuery>,
) -> AppResult<impl IntoResponse> {
    let stories = StoryRepo::list_by_user_with_context(&state.pool, user.user_id, &params).await?;

    let items: Vec<StoryListItem> = stories
        .into_iter()
        .map(|story| {
            let context: StoryContext =
                serde_json::from_value(story.context_json).unwrap_or_default();
            StoryListItem {
                id: story.id,
                title: story.title,
                tone: story.tone,
                length_key: story.length_key,
                status: story.status,
                cover_image_url: context.cover_image_url,
                created_at: story.created_at,
            }
        })
        .collect();

    Ok(Json(items))
}

/// DELETE /api/v1/stories/{id}
///
/// Owner-checked hard delete; chapters and paragraphs cascade.
pub async fn delete_story(
    State(state): State<AppState>,
    user: AuthUser,
    Path(story_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = StoryRepo::delete_owned(&state.pool, story_id, user.user_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Story",
            id: story_id,
        }));
    }

    state
        .event_bus
        .publish(StoryEvent::story_deleted(story_id, user.user_id));

    Ok(Json(json!({ "ok": true })))
}
