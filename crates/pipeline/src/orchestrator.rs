//! The chapter orchestrator: pricing and balance gates, prompt assembly,
//! text generation, persistence, and the voice/image media phases.

use std::sync::Arc;

use serde::Serialize;

use lullaby_core::context::{SpecSnapshot, StoryContext};
use lullaby_core::error::CoreError;
use lullaby_core::images::{build_image_prompt, ImagePromptContext};
use lullaby_core::pricing::chapter_cost;
use lullaby_core::prompt::{
    build_generation_prompt, build_story_spec, clamp_direction, tail_recap, SpecInput, StorySpec,
};
use lullaby_core::story::{LengthTier, StoryStatus};
use lullaby_core::tones::serialize_tones;
use lullaby_core::types::DbId;
use lullaby_db::models::coins::CoinTransactionType;
use lullaby_db::models::paragraph::NewParagraph;
use lullaby_db::models::story::{NewStory, Story, UpdateStory};
use lullaby_db::repositories::coin_repo::DeductError;
use lullaby_db::repositories::{ChapterRepo, CoinRepo, ParagraphRepo, StoryRepo};
use lullaby_db::DbPool;
use lullaby_events::{EventBus, StoryEvent};
use lullaby_providers::parse::fallback_title_summary;
use lullaby_providers::{Providers, SpeechRequest};
use lullaby_storage::{audio_object_path, image_object_path, BlobStore, AUDIO_CONTENT_TYPE};

use crate::error::PipelineError;
use crate::{consistency, media};

/// Validated story-creation inputs. Request parsing and defaulting happen at
/// the API boundary; this struct is already normalized.
#[derive(Debug, Clone)]
pub struct CreateStoryInput {
    pub tones: Vec<String>,
    pub length: LengthTier,
    pub ruleset_id: String,
    pub user_input: String,
    pub tags: Vec<String>,
    pub story_rules: String,
    pub voice_id: String,
    pub voice_tier: lullaby_core::voices::VoiceTier,
    pub language: String,
    pub include_images: bool,
    pub include_voice: bool,
    pub facts_only: bool,
}

/// Flow A result returned to the caller immediately; media follows later.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedStory {
    pub story_id: DbId,
    pub chapter_id: DbId,
    pub coin_cost: i64,
}

/// Flow B result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaOutcome {
    pub ok: bool,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_generated: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_total: Option<usize>,
}

/// Flow C result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuedChapter {
    pub story_id: DbId,
    pub chapter_id: DbId,
    pub chapter_index: i32,
    pub coin_cost: i64,
}

/// Coordinates pricing, ledger, generation, and persistence for all three
/// flows. Constructed once at process start with its collaborators injected.
pub struct ChapterOrchestrator {
    pool: DbPool,
    providers: Providers,
    blobs: Arc<dyn BlobStore>,
    events: Arc<EventBus>,
}

impl ChapterOrchestrator {
    pub fn new(
        pool: DbPool,
        providers: Providers,
        blobs: Arc<dyn BlobStore>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            pool,
            providers,
            blobs,
            events,
        }
    }

    // -----------------------------------------------------------------
    // Flow A: story creation
    // -----------------------------------------------------------------

    /// Create a story and its first chapter: price, balance gate, text
    /// generation, persistence, deduction. Voice/images/title are deferred
    /// to [`generate_media`](Self::generate_media), which the client
    /// triggers after observing `status == "generating"`.
    pub async fn create_story(
        &self,
        user_id: DbId,
        input: CreateStoryInput,
    ) -> Result<CreatedStory, PipelineError> {
        let coin_cost = chapter_cost(
            true,
            input.include_voice,
            input.include_images,
            input.voice_tier,
            input.length,
        );
        let balance = CoinRepo::get_balance(&self.pool, user_id).await?;
        if balance < coin_cost {
            return Err(CoreError::InsufficientCoins {
                cost: coin_cost,
                balance,
            }
            .into());
        }

        let spec = build_story_spec(&SpecInput {
            user_input: input.user_input.clone(),
            tags: input.tags.clone(),
            tones: input.tones.clone(),
            length: input.length,
            ruleset_id: input.ruleset_id.clone(),
            story_rules: input.story_rules.clone(),
            language: input.language.clone(),
            facts_only: input.facts_only,
        });
        let initial_prompt = build_generation_prompt(&spec, 1, None, None);

        // Generate before persisting anything: malformed output must leave
        // no story rows behind.
        let paragraphs = self
            .providers
            .text
            .generate_paragraphs(&initial_prompt)
            .await
            .map_err(PipelineError::from_paragraph_error)?;

        let context = StoryContext {
            user_input: input.user_input,
            tags: input.tags,
            story_rules: input.story_rules,
            voice_id: input.voice_id,
            voice_tier: input.voice_tier,
            language: input.language,
            include_images: input.include_images,
            include_voice: input.include_voice,
            facts_only: input.facts_only,
            style_hint: spec.style_hint.clone(),
            rules_version: spec.rules_version,
            initial_prompt,
            spec_snapshot: Some(SpecSnapshot {
                tones: spec.tones.clone(),
                length: spec.length,
                paragraph_count: spec.paragraph_count,
                style_hint: spec.style_hint.clone(),
            }),
            ..Default::default()
        };

        let story = StoryRepo::insert(
            &self.pool,
            &NewStory {
                user_id,
                tone: serialize_tones(&spec.tones),
                length_key: input.length.as_str().to_string(),
                ruleset_id: input.ruleset_id,
                context_json: serde_json::to_value(&context)
                    .map_err(|e| CoreError::Internal(format!("context serialization: {e}")))?,
            },
        )
        .await?;

        let chapter = ChapterRepo::insert(&self.pool, story.id, 1).await?;
        ParagraphRepo::insert_batch(&self.pool, chapter.id, &number_paragraphs(&paragraphs))
            .await?;

        self.deduct(
            user_id,
            coin_cost,
            CoinTransactionType::StoryCreate,
            Some(story.id),
            &format!("First chapter of story {}", story.id),
        )
        .await?;

        self.events
            .publish(StoryEvent::story_created(story.id, user_id, coin_cost));

        Ok(CreatedStory {
            story_id: story.id,
            chapter_id: chapter.id,
            coin_cost,
        })
    }

    // -----------------------------------------------------------------
    // Flow B: deferred media generation
    // -----------------------------------------------------------------

    /// Run the deferred media phase for a story's first chapter: voice and
    /// image branches concurrently, then title/summary, then the terminal
    /// status transitions.
    ///
    /// Idempotent: a story already in `done` returns immediately with no
    /// provider calls and no writes, so re-invocation after a client
    /// timeout is safe.
    pub async fn generate_media(
        &self,
        user_id: DbId,
        story_id: DbId,
    ) -> Result<MediaOutcome, PipelineError> {
        let story = self.load_owned_story(story_id, user_id).await?;
        if StoryStatus::is_done(&story.status) {
            return Ok(MediaOutcome {
                ok: true,
                status: StoryStatus::Done.as_str(),
                voice_generated: None,
                voice_total: None,
            });
        }

        let context = parse_context(&story)?;
        let length = LengthTier::parse(&story.length_key)?;

        let chapter = ChapterRepo::first_of_story(&self.pool, story.id)
            .await?
            .ok_or_else(|| CoreError::Validation("Story has no chapters".to_string()))?;
        let rows = ParagraphRepo::list_by_chapter(&self.pool, chapter.id).await?;
        if rows.is_empty() {
            return Err(CoreError::Validation("No paragraphs to process".to_string()).into());
        }
        let paragraph_texts: Vec<String> = rows.iter().map(|p| p.text.clone()).collect();
        let language = lullaby_core::language::language_option(&context.language);

        // Voice and images hit different providers; run the branches
        // concurrently and join before any status transition.
        let voice_branch = self.run_voice_branch(
            &context,
            user_id,
            story.id,
            chapter.id,
            &paragraph_texts,
        );
        let image_branch = self.run_image_branch(
            &context,
            user_id,
            story.id,
            chapter.id,
            &paragraph_texts,
            length,
        );
        let (voice, images) = tokio::join!(voice_branch, image_branch);

        ChapterRepo::mark_done(&self.pool, chapter.id).await?;

        // Title/summary degrade to fallbacks, never to a request error.
        let first_paragraph = paragraph_texts.first().map(String::as_str).unwrap_or("");
        let title_summary = match self
            .providers
            .text
            .generate_title_and_summary(first_paragraph, language.prompt_name)
            .await
        {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(story_id, error = %err, "title/summary failed; using fallback");
                fallback_title_summary(first_paragraph)
            }
        };

        let mut updated_context = context;
        updated_context.summary = Some(title_summary.summary);
        updated_context.cover_image_url = images.cover_image_url.clone();
        updated_context.visual_consistency_ref = images.visual_consistency_ref.clone();
        updated_context.voice_warning =
            media::voice_warning(updated_context.include_voice, voice.persisted);

        StoryRepo::update(
            &self.pool,
            story.id,
            &UpdateStory {
                title: Some(title_summary.title),
                context_json: Some(
                    serde_json::to_value(&updated_context)
                        .map_err(|e| CoreError::Internal(format!("context serialization: {e}")))?,
                ),
            },
        )
        .await?;
        StoryRepo::mark_done(&self.pool, story.id).await?;

        self.events.publish(StoryEvent::media_completed(
            story.id,
            user_id,
            voice.persisted,
            voice.total,
            images.persisted,
        ));

        Ok(MediaOutcome {
            ok: true,
            status: StoryStatus::Done.as_str(),
            voice_generated: Some(voice.persisted),
            voice_total: Some(voice.total),
        })
    }

    // -----------------------------------------------------------------
    // Flow C: chapter continuation
    // -----------------------------------------------------------------

    /// Append a chapter to an existing story. Tone, voice, language, and
    /// rules come from the stored context, never from the request; the only
    /// request-scoped input is an optional one-off direction nudge. Voice
    /// (and images, when the story has them) are synthesized inline.
    pub async fn continue_story(
        &self,
        user_id: DbId,
        story_id: DbId,
        direction_input: Option<String>,
    ) -> Result<ContinuedChapter, PipelineError> {
        let story = self.load_owned_story(story_id, user_id).await?;
        let context = parse_context(&story)?;
        let length = LengthTier::parse(&story.length_key)?;

        let coin_cost = chapter_cost(
            false,
            context.include_voice,
            false,
            context.voice_tier,
            length,
        );
        let balance = CoinRepo::get_balance(&self.pool, user_id).await?;
        if balance < coin_cost {
            return Err(CoreError::InsufficientCoins {
                cost: coin_cost,
                balance,
            }
            .into());
        }

        let next_index = ChapterRepo::count_by_story(&self.pool, story.id).await? as i32 + 1;

        let recap = match ChapterRepo::last_of_story(&self.pool, story.id).await? {
            Some(last) => {
                let rows = ParagraphRepo::list_by_chapter(&self.pool, last.id).await?;
                let joined = rows
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                tail_recap(&joined)
            }
            None => String::new(),
        };

        let spec = spec_from_context(&story, &context, length);
        let direction = direction_input.as_deref().map(clamp_direction);
        let prompt = build_generation_prompt(
            &spec,
            next_index as u32,
            Some(recap.as_str()).filter(|r| !r.is_empty()),
            direction.as_deref(),
        );

        let paragraphs = self
            .providers
            .text
            .generate_paragraphs(&prompt)
            .await
            .map_err(PipelineError::from_paragraph_error)?;

        let chapter = ChapterRepo::insert(&self.pool, story.id, next_index).await?;
        ParagraphRepo::insert_batch(&self.pool, chapter.id, &number_paragraphs(&paragraphs))
            .await?;

        if context.include_voice {
            self.run_voice_branch(&context, user_id, story.id, chapter.id, &paragraphs)
                .await;
        }
        // Continuations reuse the stored consistency reference; without one
        // (images disabled, or the media phase never produced it) no images
        // are generated.
        if context.include_images && context.visual_consistency_ref.is_some() {
            let plan = media::plan_chapter_images(paragraphs.len(), length, 1);
            self.generate_images(
                &context,
                user_id,
                story.id,
                chapter.id,
                &paragraphs,
                &plan,
                context.visual_consistency_ref.clone(),
            )
            .await;
        }

        ChapterRepo::mark_done(&self.pool, chapter.id).await?;

        self.deduct(
            user_id,
            coin_cost,
            CoinTransactionType::ChapterContinue,
            Some(chapter.id),
            &format!("Chapter {next_index} of story {}", story.id),
        )
        .await?;

        self.events.publish(StoryEvent::chapter_added(
            story.id, user_id, next_index, coin_cost,
        ));

        Ok(ContinuedChapter {
            story_id: story.id,
            chapter_id: chapter.id,
            chapter_index: next_index,
            coin_cost,
        })
    }

    // -----------------------------------------------------------------
    // Shared helpers
    // -----------------------------------------------------------------

    async fn load_owned_story(
        &self,
        story_id: DbId,
        user_id: DbId,
    ) -> Result<Story, PipelineError> {
        StoryRepo::find_owned(&self.pool, story_id, user_id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "Story",
                    id: story_id,
                }
                .into()
            })
    }

    async fn deduct(
        &self,
        user_id: DbId,
        amount: i64,
        tx_type: CoinTransactionType,
        reference_id: Option<DbId>,
        description: &str,
    ) -> Result<(), PipelineError> {
        match CoinRepo::deduct(&self.pool, user_id, amount, tx_type, reference_id, description)
            .await
        {
            Ok(_) => Ok(()),
            Err(DeductError::Insufficient(core)) => Err(core.into()),
            Err(DeductError::Database(db)) => Err(db.into()),
        }
    }

    /// Voice branch: concurrent synthesis fan-out, then sequential
    /// upload-and-persist keyed by `(chapter_id, paragraph_index)`.
    async fn run_voice_branch(
        &self,
        context: &StoryContext,
        user_id: DbId,
        story_id: DbId,
        chapter_id: DbId,
        paragraph_texts: &[String],
    ) -> VoiceBranchResult {
        if !context.include_voice {
            return VoiceBranchResult {
                persisted: 0,
                total: 0,
            };
        }

        let request = SpeechRequest {
            voice_id: context.voice_id.clone(),
            voice_tier: context.voice_tier,
            language: context.language.clone(),
        };
        let batch =
            media::synthesize_voice_batch(self.providers.speech.as_deref(), paragraph_texts, &request)
                .await;
        let total = batch.total();

        let mut persisted = 0;
        for outcome in batch.outcomes {
            let Some(bytes) = outcome.audio else { continue };
            let path = audio_object_path(user_id, story_id, chapter_id, outcome.paragraph_index);
            match self.blobs.put(&path, bytes, AUDIO_CONTENT_TYPE).await {
                Ok(url) => {
                    match ParagraphRepo::set_audio(
                        &self.pool,
                        chapter_id,
                        outcome.paragraph_index,
                        &url,
                    )
                    .await
                    {
                        Ok(()) => persisted += 1,
                        Err(err) => {
                            tracing::error!(
                                chapter_id,
                                paragraph_index = outcome.paragraph_index,
                                error = %err,
                                "failed to persist audio url"
                            );
                        }
                    }
                }
                Err(err) => {
                    tracing::error!(
                        chapter_id,
                        paragraph_index = outcome.paragraph_index,
                        error = %err,
                        "audio upload failed"
                    );
                }
            }
        }

        VoiceBranchResult { persisted, total }
    }

    /// Image branch for the media phase: build the consistency reference
    /// once, then generate the planned images strictly sequentially.
    async fn run_image_branch(
        &self,
        context: &StoryContext,
        user_id: DbId,
        story_id: DbId,
        chapter_id: DbId,
        paragraph_texts: &[String],
        length: LengthTier,
    ) -> ImageBranchResult {
        if !context.include_images {
            return ImageBranchResult::default();
        }
        let plan = media::plan_chapter_images(paragraph_texts.len(), length, 0);
        if plan.is_empty() {
            return ImageBranchResult::default();
        }

        let language = lullaby_core::language::language_option(&context.language);
        let visual_consistency_ref = consistency::build_visual_reference(
            self.providers.text.as_ref(),
            paragraph_texts,
            language.prompt_name,
        )
        .await;

        let mut result = self
            .generate_images(
                context,
                user_id,
                story_id,
                chapter_id,
                paragraph_texts,
                &plan,
                visual_consistency_ref.clone(),
            )
            .await;
        result.visual_consistency_ref = visual_consistency_ref;
        result
    }

    /// Sequentially generate and persist the planned images. Each success is
    /// written immediately so partial progress survives a crash; each
    /// failure is caught, logged, and skipped.
    #[allow(clippy::too_many_arguments)]
    async fn generate_images(
        &self,
        context: &StoryContext,
        user_id: DbId,
        story_id: DbId,
        chapter_id: DbId,
        paragraph_texts: &[String],
        plan: &[media::ImagePlanItem],
        visual_consistency_ref: Option<String>,
    ) -> ImageBranchResult {
        let mut result = ImageBranchResult::default();

        for item in plan {
            let text = &paragraph_texts[item.paragraph_offset];
            let prompt = build_image_prompt(
                text,
                &ImagePromptContext {
                    visual_consistency_ref: visual_consistency_ref.clone(),
                    scene_role: Some(item.scene_role),
                    tags: context.tags.clone(),
                    facts_mode: context.facts_only,
                },
            );
            let path = image_object_path(user_id, story_id, chapter_id, item.paragraph_index);

            match media::generate_and_upload_image(
                self.providers.image.as_ref(),
                self.blobs.as_ref(),
                &prompt,
                &path,
            )
            .await
            {
                Ok(url) => {
                    match ParagraphRepo::set_image(
                        &self.pool,
                        chapter_id,
                        item.paragraph_index,
                        &url,
                        &prompt,
                    )
                    .await
                    {
                        Ok(()) => {
                            result.persisted += 1;
                            if result.cover_image_url.is_none() {
                                result.cover_image_url = Some(url);
                            }
                        }
                        Err(err) => {
                            tracing::error!(
                                chapter_id,
                                paragraph_index = item.paragraph_index,
                                error = %err,
                                "failed to persist image url"
                            );
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        chapter_id,
                        paragraph_index = item.paragraph_index,
                        error = %err,
                        "image generation failed"
                    );
                }
            }
        }

        result
    }
}

/// Counts from the voice branch.
struct VoiceBranchResult {
    persisted: usize,
    total: usize,
}

/// Results from the image branch.
#[derive(Default)]
struct ImageBranchResult {
    persisted: usize,
    cover_image_url: Option<String>,
    visual_consistency_ref: Option<String>,
}

/// Assign dense 1-based indices in the generator's output order.
fn number_paragraphs(paragraphs: &[String]) -> Vec<NewParagraph> {
    paragraphs
        .iter()
        .enumerate()
        .map(|(i, text)| NewParagraph {
            paragraph_index: i as i32 + 1,
            text: text.clone(),
            audio_url: None,
        })
        .collect()
}

/// Parse the stored context blob. Unknown fields are tolerated by the
/// context schema; anything else indicates a corrupted row.
fn parse_context(story: &Story) -> Result<StoryContext, PipelineError> {
    serde_json::from_value(story.context_json.clone())
        .map_err(|e| CoreError::Internal(format!("story {} context unreadable: {e}", story.id)).into())
}

/// Rebuild the generation spec for a continuation from the stored story
/// row and context.
fn spec_from_context(story: &Story, context: &StoryContext, length: LengthTier) -> StorySpec {
    build_story_spec(&SpecInput {
        user_input: context.user_input.clone(),
        tags: context.tags.clone(),
        tones: lullaby_core::tones::parse_tones(&story.tone),
        length,
        ruleset_id: story.ruleset_id.clone(),
        story_rules: context.story_rules.clone(),
        language: context.language.clone(),
        facts_only: context.facts_only,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_numbering_is_dense_and_one_based() {
        for n in 1..=12 {
            let texts: Vec<String> = (0..n).map(|i| format!("para {i}")).collect();
            let rows = number_paragraphs(&texts);
            assert_eq!(rows.len(), n);
            for (i, row) in rows.iter().enumerate() {
                assert_eq!(row.paragraph_index, i as i32 + 1);
                assert_eq!(row.text, format!("para {i}"));
                assert!(row.audio_url.is_none());
            }
        }
    }

    #[test]
    fn spec_reconstruction_uses_stored_tone_not_request() {
        let story = Story {
            id: 1,
            user_id: 2,
            title: None,
            tone: "adventurous,informatical".to_string(),
            length_key: "short".to_string(),
            ruleset_id: "default".to_string(),
            context_json: serde_json::json!({}),
            status: "done".to_string(),
            created_at: chrono::Utc::now(),
        };
        let context = StoryContext {
            user_input: "a brave snail".to_string(),
            ..Default::default()
        };
        let spec = spec_from_context(&story, &context, LengthTier::Short);
        assert_eq!(spec.tones, vec!["adventurous", "informatical"]);
        assert!(spec.style_hint.contains("Adventurous + Informatical"));
        assert!(spec.style_hint.contains("educational facts"));
        assert_eq!(spec.user_input, "a brave snail");
    }
}
