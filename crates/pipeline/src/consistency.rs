//! Visual consistency reference: one short character/palette description
//! derived from the chapter text and reused by every image call.

use lullaby_providers::TextGenerator;

/// Build the visual consistency reference for a chapter.
///
/// Failure here is a substep failure: the images are still generated, just
/// without the cross-image character lock, so this returns `None` instead of
/// propagating the error.
pub async fn build_visual_reference(
    text_generator: &dyn TextGenerator,
    paragraphs: &[String],
    language: &str,
) -> Option<String> {
    let chapter_text = paragraphs.join("\n\n");
    match text_generator
        .generate_visual_reference(&chapter_text, language)
        .await
    {
        Ok(reference) => Some(reference),
        Err(err) => {
            tracing::warn!(error = %err, "visual consistency reference failed; images proceed without it");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lullaby_providers::{ProviderError, ProviderResult, TitleSummary};

    struct StubTextGenerator {
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for StubTextGenerator {
        async fn generate_paragraphs(&self, _prompt: &str) -> ProviderResult<Vec<String>> {
            unreachable!("not used in this test")
        }

        async fn generate_title_and_summary(
            &self,
            _first_paragraph: &str,
            _language: &str,
        ) -> ProviderResult<TitleSummary> {
            unreachable!("not used in this test")
        }

        async fn generate_visual_reference(
            &self,
            chapter_text: &str,
            _language: &str,
        ) -> ProviderResult<String> {
            if self.fail {
                return Err(ProviderError::MissingData("boom".into()));
            }
            assert!(chapter_text.contains("first"));
            assert!(chapter_text.contains("second"));
            Ok("Pip: gray mouse, pink ears.".to_string())
        }
    }

    #[tokio::test]
    async fn reference_is_built_from_joined_paragraphs() {
        let stub = StubTextGenerator { fail: false };
        let reference = build_visual_reference(
            &stub,
            &["first".to_string(), "second".to_string()],
            "English",
        )
        .await;
        assert_eq!(reference.as_deref(), Some("Pip: gray mouse, pink ears."));
    }

    #[tokio::test]
    async fn failure_degrades_to_none() {
        let stub = StubTextGenerator { fail: true };
        let reference = build_visual_reference(&stub, &["first".to_string()], "English").await;
        assert!(reference.is_none());
    }
}
