//! Media fan-out building blocks: per-item result types for voice and image
//! synthesis, plus the aggregation helpers that operate on them.

use futures::future::join_all;

use lullaby_core::images::{image_count_for_chapter, pick_image_indices, SceneRole};
use lullaby_core::story::LengthTier;
use lullaby_providers::{ImageGenerator, SpeechRequest, SpeechSynthesizer};
use lullaby_storage::{BlobStore, StorageError, IMAGE_CONTENT_TYPE};

/// Warning stored in the story context when voice was requested but no
/// paragraph ended up with audio.
pub const VOICE_WARNING: &str = "Voice narration could not be generated for this story. \
    The text is still here to read aloud together.";

/// Result of one paragraph's synthesis attempt.
#[derive(Debug)]
pub struct VoiceOutcome {
    /// 1-based paragraph index.
    pub paragraph_index: i32,
    /// MP3 bytes on success; `None` records a caught failure.
    pub audio: Option<Vec<u8>>,
}

/// Collected results of a chapter's voice fan-out.
#[derive(Debug, Default)]
pub struct VoiceBatch {
    pub outcomes: Vec<VoiceOutcome>,
}

impl VoiceBatch {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.audio.is_some()).count()
    }
}

/// Synthesize audio for every paragraph concurrently.
///
/// Each paragraph's failure is caught and recorded as `None` without
/// aborting its siblings. A `None` synthesizer (narration disabled at the
/// environment level) yields a batch of all-failed outcomes, which flows
/// into the same zero-success warning as a total provider outage.
pub async fn synthesize_voice_batch(
    speech: Option<&dyn SpeechSynthesizer>,
    paragraph_texts: &[String],
    request: &SpeechRequest,
) -> VoiceBatch {
    let Some(speech) = speech else {
        return VoiceBatch {
            outcomes: paragraph_texts
                .iter()
                .enumerate()
                .map(|(i, _)| VoiceOutcome {
                    paragraph_index: i as i32 + 1,
                    audio: None,
                })
                .collect(),
        };
    };

    let tasks = paragraph_texts.iter().enumerate().map(|(i, text)| {
        let paragraph_index = i as i32 + 1;
        async move {
            match speech.synthesize(text, request).await {
                Ok(bytes) => VoiceOutcome {
                    paragraph_index,
                    audio: Some(bytes),
                },
                Err(err) => {
                    tracing::warn!(paragraph_index, error = %err, "voice synthesis failed");
                    VoiceOutcome {
                        paragraph_index,
                        audio: None,
                    }
                }
            }
        }
    });

    VoiceBatch {
        outcomes: join_all(tasks).await,
    }
}

/// The zero-success warning, synthesized from persisted audio counts.
pub fn voice_warning(voice_requested: bool, persisted_count: usize) -> Option<String> {
    if voice_requested && persisted_count == 0 {
        Some(VOICE_WARNING.to_string())
    } else {
        None
    }
}

/// One planned illustration for a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePlanItem {
    /// 0-based paragraph index into the chapter.
    pub paragraph_offset: usize,
    /// 1-based paragraph index (database key).
    pub paragraph_index: i32,
    /// Role controlling composition variety.
    pub scene_role: SceneRole,
}

/// Plan which paragraphs of a chapter receive images.
///
/// `first_image_number` is the story-wide count of images generated before
/// this chapter: 0 for the first chapter (its first image is the opening
/// shot), nonzero for continuations (every image is a later scene).
pub fn plan_chapter_images(
    paragraph_count: usize,
    length: LengthTier,
    first_image_number: usize,
) -> Vec<ImagePlanItem> {
    let indices = pick_image_indices(paragraph_count, image_count_for_chapter(length));
    indices
        .into_iter()
        .enumerate()
        .map(|(i, offset)| ImagePlanItem {
            paragraph_offset: offset,
            paragraph_index: offset as i32 + 1,
            scene_role: SceneRole::for_image_index(first_image_number + i),
        })
        .collect()
}

/// Errors from one image's generate-and-upload step. Callers catch these
/// per item; a failure never aborts the sibling images.
#[derive(Debug, thiserror::Error)]
pub enum ImageStepError {
    #[error(transparent)]
    Provider(#[from] lullaby_providers::ProviderError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Generate one illustration and store it, returning the public URL.
pub async fn generate_and_upload_image(
    image: &dyn ImageGenerator,
    blobs: &dyn BlobStore,
    prompt: &str,
    object_path: &str,
) -> Result<String, ImageStepError> {
    let bytes = image.generate(prompt).await?;
    let url = blobs.put(object_path, bytes, IMAGE_CONTENT_TYPE).await?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use lullaby_core::voices::VoiceTier;
    use lullaby_providers::{ProviderError, ProviderResult};

    struct FlakySpeech {
        /// 1-based paragraph indices that fail.
        failing: Vec<i32>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SpeechSynthesizer for FlakySpeech {
        async fn synthesize(
            &self,
            text: &str,
            _request: &SpeechRequest,
        ) -> ProviderResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Texts are "p1", "p2", ... so the index is recoverable.
            let index: i32 = text.trim_start_matches('p').parse().unwrap();
            if self.failing.contains(&index) {
                Err(ProviderError::Api {
                    status: 500,
                    message: "synth down".into(),
                })
            } else {
                Ok(format!("mp3:{text}").into_bytes())
            }
        }
    }

    fn request() -> SpeechRequest {
        SpeechRequest {
            voice_id: "lily".to_string(),
            voice_tier: VoiceTier::Standard,
            language: "en".to_string(),
        }
    }

    fn texts(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("p{i}")).collect()
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_siblings() {
        let speech = FlakySpeech {
            failing: vec![2],
            calls: AtomicUsize::new(0),
        };
        let batch = synthesize_voice_batch(Some(&speech), &texts(4), &request()).await;

        assert_eq!(batch.total(), 4);
        assert_eq!(batch.succeeded(), 3);
        assert!(batch.outcomes[0].audio.is_some());
        assert!(batch.outcomes[1].audio.is_none());
        assert!(batch.outcomes[2].audio.is_some());
        assert!(batch.outcomes[3].audio.is_some());
        // Every paragraph was attempted exactly once.
        assert_eq!(speech.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn outcomes_keep_one_based_indices_in_order() {
        let speech = FlakySpeech {
            failing: vec![],
            calls: AtomicUsize::new(0),
        };
        let batch = synthesize_voice_batch(Some(&speech), &texts(3), &request()).await;
        let indices: Vec<i32> = batch.outcomes.iter().map(|o| o.paragraph_index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn disabled_capability_yields_all_failed_batch() {
        let batch = synthesize_voice_batch(None, &texts(3), &request()).await;
        assert_eq!(batch.total(), 3);
        assert_eq!(batch.succeeded(), 0);
    }

    #[test]
    fn warning_only_on_requested_total_failure() {
        assert!(voice_warning(true, 0).is_some());
        assert!(voice_warning(true, 1).is_none());
        assert!(voice_warning(false, 0).is_none());
    }

    #[test]
    fn first_chapter_plan_opens_then_varies() {
        let plan = plan_chapter_images(8, LengthTier::Medium, 0);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].paragraph_offset, 0);
        assert_eq!(plan[0].paragraph_index, 1);
        assert_eq!(plan[0].scene_role, SceneRole::Opening);
        assert_eq!(plan[1].paragraph_offset, 7);
        assert_eq!(plan[1].scene_role, SceneRole::Later);
    }

    #[test]
    fn continuation_plan_never_reopens() {
        let plan = plan_chapter_images(5, LengthTier::Short, 2);
        assert!(plan.iter().all(|item| item.scene_role == SceneRole::Later));
    }

    #[test]
    fn single_paragraph_chapter_gets_one_image() {
        let plan = plan_chapter_images(1, LengthTier::Micro, 0);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].paragraph_index, 1);
    }

    struct StubImage {
        fail: bool,
    }

    #[async_trait]
    impl ImageGenerator for StubImage {
        async fn generate(&self, _prompt: &str) -> ProviderResult<Vec<u8>> {
            if self.fail {
                Err(ProviderError::Api {
                    status: 429,
                    message: "rate limited".into(),
                })
            } else {
                Ok(vec![0x89, 0x50, 0x4e, 0x47])
            }
        }
    }

    #[derive(Default)]
    struct RecordingBlobs {
        paths: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BlobStore for RecordingBlobs {
        async fn put(
            &self,
            path: &str,
            _bytes: Vec<u8>,
            content_type: &str,
        ) -> Result<String, StorageError> {
            assert_eq!(content_type, IMAGE_CONTENT_TYPE);
            self.paths.lock().unwrap().push(path.to_string());
            Ok(format!("https://cdn.example/{path}"))
        }
    }

    #[tokio::test]
    async fn image_step_returns_public_url() {
        let blobs = RecordingBlobs::default();
        let url = generate_and_upload_image(
            &StubImage { fail: false },
            &blobs,
            "a fox in a forest",
            "1/2/3_1.png",
        )
        .await
        .unwrap();
        assert_eq!(url, "https://cdn.example/1/2/3_1.png");
        assert_eq!(blobs.paths.lock().unwrap().as_slice(), ["1/2/3_1.png"]);
    }

    #[tokio::test]
    async fn image_step_failure_uploads_nothing() {
        let blobs = RecordingBlobs::default();
        let result = generate_and_upload_image(
            &StubImage { fail: true },
            &blobs,
            "a fox in a forest",
            "1/2/3_1.png",
        )
        .await;
        assert!(result.is_err());
        assert!(blobs.paths.lock().unwrap().is_empty());
    }
}
