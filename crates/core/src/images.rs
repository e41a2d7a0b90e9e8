//! Illustration planning: which paragraphs get images, and the prompt each
//! image-generation call receives.

/// Images generated per chapter.
const IMAGES_PER_CHAPTER: usize = 2;

/// Scene text passed to the image generator is bounded to this many chars.
const SCENE_TEXT_MAX_CHARS: usize = 500;

/// How many images a chapter of the given length receives.
///
/// Fixed today; the length tier parameter is kept so the table can scale
/// later without touching call sites.
pub fn image_count_for_chapter(_length: crate::story::LengthTier) -> usize {
    IMAGES_PER_CHAPTER
}

/// Evenly distributed 0-based paragraph indices that receive images.
///
/// - `image_count >= paragraph_count`: every index.
/// - `image_count == 1`: only the first index.
/// - Otherwise: `round(i * (paragraph_count - 1) / (image_count - 1))` for
///   `i` in `[0, image_count)`, which always includes the first and last
///   paragraphs.
pub fn pick_image_indices(paragraph_count: usize, image_count: usize) -> Vec<usize> {
    if paragraph_count == 0 || image_count == 0 {
        return Vec::new();
    }
    if image_count >= paragraph_count {
        return (0..paragraph_count).collect();
    }
    if image_count == 1 {
        return vec![0];
    }
    (0..image_count)
        .map(|i| {
            let numerator = (i * (paragraph_count - 1)) as f64;
            (numerator / (image_count - 1) as f64).round() as usize
        })
        .collect()
}

/// Position of an illustration within the story, used to force visual
/// variety between the first image and the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneRole {
    /// The first illustration: a wide establishing shot.
    Opening,
    /// Any subsequent illustration: must not repeat the opening's
    /// composition, location, or pose.
    Later,
}

impl SceneRole {
    /// Role for the `i`-th generated image of a story (0-based).
    pub fn for_image_index(image_index_in_story: usize) -> Self {
        if image_index_in_story == 0 {
            SceneRole::Opening
        } else {
            SceneRole::Later
        }
    }
}

/// Context threaded into every image prompt for one chapter.
#[derive(Debug, Clone, Default)]
pub struct ImagePromptContext {
    /// Character/palette description reused across all images of the story.
    pub visual_consistency_ref: Option<String>,
    pub scene_role: Option<SceneRole>,
    pub tags: Vec<String>,
    pub facts_mode: bool,
}

const STYLE_ANCHOR: &str = "Soft indie children's book illustration in painterly 2D gouache \
    and watercolor style. Visible brush texture and subtle watercolor paper grain. Muted \
    earthy color palette with moss greens, warm ochre, burnt orange, dusty blues and soft \
    cream tones. Gentle diffused lighting. Slightly flattened storybook perspective. Calm \
    whimsical atmosphere. Matte finish.";

const FORMAT_COMPOSITION: &str = "4:3 aspect ratio. Main subject slightly above vertical \
    center. Clear focal point. Balanced centered composition. Foreground, midground, soft \
    layered background. Important elements within middle 70% of frame. No cropped heads or \
    cut-off limbs. Slightly flattened storybook depth.";

const CHARACTER_RULES: &str = "Rounded shapes, soft silhouettes. Simple dot or small oval \
    eyes. Minimal facial features. Gentle posture. Child-friendly proportions. Flat color \
    blocks with subtle brush texture. Stylized storybook interpretation. No sharp teeth, \
    claws, or aggressive expressions.";

const LIGHTING: &str = "Soft diffused natural light. No sharp shadows. Soft atmospheric \
    haze. Low contrast. Calm shadows.";

const TEXTURE_ENFORCEMENT: &str =
    "Visible brush strokes. Subtle pigment variation. Watercolor paper grain. Matte finish.";

const ANTI_DRIFT: &str = "Never photorealistic, 3D, glossy, cinematic, high contrast, \
    Unreal engine look, vector clipart, stock illustration, heavy outlines, hard comic \
    linework, or overly busy micro-detail.";

const OPENING_SCENE: &str = "OPENING SCENE - First illustration only. Wide establishing \
    shot. Introduce characters and the story world. Set the mood and place. Welcoming, \
    curious. This is how the story begins.";

const LATER_SCENE: &str = "LATER SCENE - CRITICAL: This must look COMPLETELY DIFFERENT \
    from the opening. Show a NEW moment: different location, different action, or \
    different part of the story. If the opening showed characters facing each other, show \
    them doing something else - walking, playing, exploring, resting. Use a different \
    composition: closer shot, different angle, or different arrangement. Different \
    background and setting. Do NOT repeat the same scene, same pose, or same framing. \
    This illustration advances the narrative to a new moment.";

/// Build the full image-generation prompt for one paragraph.
///
/// Section order: facts hint, tag themes, style anchor, format, character
/// rules, consistency block, scene-role block, lighting, scene line,
/// texture, anti-drift. Optional sections are dropped when absent.
pub fn build_image_prompt(paragraph_text: &str, context: &ImagePromptContext) -> String {
    let scene_description: String = paragraph_text
        .trim()
        .chars()
        .take(SCENE_TEXT_MAX_CHARS)
        .collect();
    let scene_line = match context.scene_role {
        Some(SceneRole::Later) => format!(
            "Scene to illustrate (a NEW moment, different from the opening): {scene_description}"
        ),
        _ => format!("Scene to illustrate: {scene_description}"),
    };

    let mut parts: Vec<String> = Vec::new();
    if context.facts_mode {
        parts.push("Educational, factual illustration of the topic. Kid-friendly.".to_string());
    }
    if !context.tags.is_empty() {
        parts.push(format!(
            "Story themes/setting: {}. Ensure illustrations match these themes.",
            context.tags.join(", ")
        ));
    }
    parts.push(STYLE_ANCHOR.to_string());
    parts.push(FORMAT_COMPOSITION.to_string());
    parts.push(CHARACTER_RULES.to_string());
    if let Some(consistency) = context
        .visual_consistency_ref
        .as_deref()
        .filter(|r| !r.is_empty())
    {
        parts.push(format!(
            "CHARACTER CONSISTENCY - draw the SAME characters with the SAME appearance: \
             {consistency}"
        ));
    }
    match context.scene_role {
        Some(SceneRole::Opening) => parts.push(OPENING_SCENE.to_string()),
        Some(SceneRole::Later) => parts.push(LATER_SCENE.to_string()),
        None => {}
    }
    parts.push(LIGHTING.to_string());
    parts.push(scene_line);
    parts.push(TEXTURE_ENFORCEMENT.to_string());
    parts.push(ANTI_DRIFT.to_string());

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_cover_all_paragraphs_when_count_exceeds() {
        assert_eq!(pick_image_indices(3, 5), vec![0, 1, 2]);
        assert_eq!(pick_image_indices(4, 4), vec![0, 1, 2, 3]);
    }

    #[test]
    fn single_image_goes_to_first_paragraph() {
        assert_eq!(pick_image_indices(10, 1), vec![0]);
    }

    #[test]
    fn indices_are_distinct_sorted_and_in_range() {
        for paragraph_count in 1..=16 {
            for image_count in 1..=paragraph_count {
                let indices = pick_image_indices(paragraph_count, image_count);
                assert_eq!(indices.len(), image_count);
                for window in indices.windows(2) {
                    assert!(window[0] < window[1], "not strictly increasing: {indices:?}");
                }
                assert!(indices.iter().all(|&i| i < paragraph_count));
            }
        }
    }

    #[test]
    fn two_images_land_on_first_and_last() {
        assert_eq!(pick_image_indices(8, 2), vec![0, 7]);
        assert_eq!(pick_image_indices(5, 2), vec![0, 4]);
    }

    #[test]
    fn spread_matches_rounding_formula() {
        assert_eq!(pick_image_indices(10, 3), vec![0, 5, 9]);
        assert_eq!(pick_image_indices(12, 4), vec![0, 4, 7, 11]);
    }

    #[test]
    fn empty_inputs_yield_no_indices() {
        assert!(pick_image_indices(0, 2).is_empty());
        assert!(pick_image_indices(5, 0).is_empty());
    }

    #[test]
    fn scene_role_is_opening_only_for_first_image() {
        assert_eq!(SceneRole::for_image_index(0), SceneRole::Opening);
        assert_eq!(SceneRole::for_image_index(1), SceneRole::Later);
        assert_eq!(SceneRole::for_image_index(7), SceneRole::Later);
    }

    #[test]
    fn opening_and_later_prompts_differ_materially() {
        let ctx_opening = ImagePromptContext {
            scene_role: Some(SceneRole::Opening),
            ..Default::default()
        };
        let ctx_later = ImagePromptContext {
            scene_role: Some(SceneRole::Later),
            ..Default::default()
        };
        let opening = build_image_prompt("A fox wakes up.", &ctx_opening);
        let later = build_image_prompt("A fox wakes up.", &ctx_later);
        assert!(opening.contains("OPENING SCENE"));
        assert!(later.contains("LATER SCENE"));
        assert!(later.contains("a NEW moment"));
        assert!(!opening.contains("LATER SCENE"));
    }

    #[test]
    fn consistency_ref_is_threaded_into_prompt() {
        let ctx = ImagePromptContext {
            visual_consistency_ref: Some("Pip: gray mouse, pink ears.".to_string()),
            scene_role: Some(SceneRole::Opening),
            ..Default::default()
        };
        let prompt = build_image_prompt("Pip explores.", &ctx);
        assert!(prompt.contains("CHARACTER CONSISTENCY"));
        assert!(prompt.contains("Pip: gray mouse, pink ears."));
    }

    #[test]
    fn scene_text_is_bounded() {
        let long = "s".repeat(900);
        let prompt = build_image_prompt(&long, &ImagePromptContext::default());
        assert!(!prompt.contains(&"s".repeat(501)));
        assert!(prompt.contains(&"s".repeat(500)));
    }

    #[test]
    fn facts_mode_and_tags_prepend_hints() {
        let ctx = ImagePromptContext {
            tags: vec!["space".to_string()],
            facts_mode: true,
            ..Default::default()
        };
        let prompt = build_image_prompt("The moon orbits the earth.", &ctx);
        assert!(prompt.starts_with("Educational, factual illustration"));
        assert!(prompt.contains("Story themes/setting: space."));
    }
}
