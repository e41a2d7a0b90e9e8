//! Chapter pricing: pure coin-cost computation.
//!
//! The same function is re-derivable client-side for display, so it must
//! never depend on hidden state, randomness, or time.

use crate::story::LengthTier;
use crate::voices::VoiceTier;

/// Base cost by length tier for a first chapter generated with a cover
/// image. Higher than the continuation table because it also funds the
/// visual-consistency reference and cover-image work.
const FIRST_CHAPTER_WITH_IMAGES_BASE: [i64; 4] = [2, 2, 3, 4];

/// Base cost by length tier for continuation chapters (and for first
/// chapters created without images).
const CONTINUATION_BASE: [i64; 4] = [1, 1, 2, 2];

/// Surcharge for premium-tier narration.
const PREMIUM_VOICE_SURCHARGE: i64 = 1;

/// Cost of a text-only chapter, regardless of every other parameter.
const TEXT_ONLY_COST: i64 = 1;

/// Compute how many coins a chapter costs.
///
/// - Voice excluded entirely: flat [`TEXT_ONLY_COST`].
/// - Otherwise: `base(length, first-chapter-with-images) + premium surcharge`.
///
/// Both base tables are monotonically non-decreasing in length tier.
pub fn chapter_cost(
    is_first_chapter: bool,
    include_voice: bool,
    include_images: bool,
    voice_tier: VoiceTier,
    length: LengthTier,
) -> i64 {
    if !include_voice {
        return TEXT_ONLY_COST;
    }

    let base = if is_first_chapter && include_images {
        FIRST_CHAPTER_WITH_IMAGES_BASE[length.index()]
    } else {
        CONTINUATION_BASE[length.index()]
    };

    match voice_tier {
        VoiceTier::Premium => base + PREMIUM_VOICE_SURCHARGE,
        VoiceTier::Standard => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_voice_is_always_one_coin() {
        for tier in LengthTier::ALL {
            for first in [true, false] {
                for images in [true, false] {
                    assert_eq!(
                        chapter_cost(first, false, images, VoiceTier::Premium, tier),
                        1
                    );
                }
            }
        }
    }

    #[test]
    fn premium_is_standard_plus_one() {
        for tier in LengthTier::ALL {
            for first in [true, false] {
                for images in [true, false] {
                    let standard = chapter_cost(first, true, images, VoiceTier::Standard, tier);
                    let premium = chapter_cost(first, true, images, VoiceTier::Premium, tier);
                    assert_eq!(premium, standard + 1);
                }
            }
        }
    }

    #[test]
    fn cost_is_monotonic_in_length() {
        for first in [true, false] {
            for images in [true, false] {
                let mut prev = 0;
                for tier in LengthTier::ALL {
                    let cost = chapter_cost(first, true, images, VoiceTier::Standard, tier);
                    assert!(cost >= prev, "cost decreased at {tier:?}");
                    prev = cost;
                }
            }
        }
    }

    #[test]
    fn first_chapter_with_images_costs_more_than_continuation() {
        for tier in LengthTier::ALL {
            let first = chapter_cost(true, true, true, VoiceTier::Standard, tier);
            let cont = chapter_cost(false, true, true, VoiceTier::Standard, tier);
            assert!(first >= cont);
        }
    }

    #[test]
    fn image_flag_only_matters_for_first_chapter() {
        // Continuation chapters never carry the image-bearing base table.
        for tier in LengthTier::ALL {
            assert_eq!(
                chapter_cost(false, true, true, VoiceTier::Standard, tier),
                chapter_cost(false, true, false, VoiceTier::Standard, tier)
            );
        }
    }

    #[test]
    fn short_first_chapter_prices_match_launch_rates() {
        // short, first chapter with images: 2 standard / 3 premium
        assert_eq!(
            chapter_cost(true, true, true, VoiceTier::Standard, LengthTier::Short),
            2
        );
        assert_eq!(
            chapter_cost(true, true, true, VoiceTier::Premium, LengthTier::Short),
            3
        );
        // short continuation: 1 standard / 2 premium
        assert_eq!(
            chapter_cost(false, true, false, VoiceTier::Standard, LengthTier::Short),
            1
        );
        assert_eq!(
            chapter_cost(false, true, false, VoiceTier::Premium, LengthTier::Short),
            2
        );
    }

    #[test]
    fn long_premium_first_chapter_is_at_least_four() {
        let cost = chapter_cost(true, true, true, VoiceTier::Premium, LengthTier::Long);
        assert!(cost >= 4);
    }

    #[test]
    fn cost_is_always_at_least_one() {
        for tier in LengthTier::ALL {
            for first in [true, false] {
                for voice in [true, false] {
                    for images in [true, false] {
                        for vt in [VoiceTier::Standard, VoiceTier::Premium] {
                            assert!(chapter_cost(first, voice, images, vt, tier) >= 1);
                        }
                    }
                }
            }
        }
    }
}
