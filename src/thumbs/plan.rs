// Thumbnail size planner
//
// Each (media kind, size) pair has its own fit rule. The photo SM/M asymmetry
// (longest edge vs shortest edge, both 320) mirrors what Synology itself writes
// and must not be unified.

use crate::constants::{
    PHOTO_M_SHORT_EDGE, PHOTO_SM_LONG_EDGE, PHOTO_XL_SHORT_EDGE, VIDEO_M_LONG_EDGE,
    VIDEO_SM_LONG_EDGE,
};
use crate::error::{Result, ThumbError};
use crate::metadata::{Dimensions, MediaKind};
use crate::thumbs::ThumbSize;

/// How a source is scaled for one thumbnail size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitRule {
    /// Longer edge becomes the target
    LongEdge(u32),
    /// Shorter edge becomes the target
    ShortEdge(u32),
    /// Keep the source resolution
    Original,
}

impl FitRule {
    pub fn for_size(kind: MediaKind, size: ThumbSize) -> Option<Self> {
        match (kind, size) {
            (MediaKind::Photo, ThumbSize::Sm) => Some(FitRule::LongEdge(PHOTO_SM_LONG_EDGE)),
            (MediaKind::Photo, ThumbSize::M) => Some(FitRule::ShortEdge(PHOTO_M_SHORT_EDGE)),
            (MediaKind::Photo, ThumbSize::Xl) => Some(FitRule::ShortEdge(PHOTO_XL_SHORT_EDGE)),
            (MediaKind::Video, ThumbSize::Sm) => Some(FitRule::LongEdge(VIDEO_SM_LONG_EDGE)),
            (MediaKind::Video, ThumbSize::M) => Some(FitRule::LongEdge(VIDEO_M_LONG_EDGE)),
            (MediaKind::Video, ThumbSize::Xl) => Some(FitRule::Original),
            (MediaKind::Unsupported, _) => None,
        }
    }

    /// Apply the rule. Sources already at or under the target are never upscaled.
    pub fn apply(self, src: Dimensions) -> Dimensions {
        match self {
            FitRule::Original => src,
            FitRule::LongEdge(target) => {
                if src.long_edge() <= target {
                    src
                } else if src.is_landscape() {
                    Dimensions::new(target, scale(src.height, target, src.width))
                } else {
                    Dimensions::new(scale(src.width, target, src.height), target)
                }
            }
            FitRule::ShortEdge(target) => {
                if src.short_edge() <= target {
                    src
                } else if src.is_landscape() {
                    Dimensions::new(scale(src.width, target, src.height), target)
                } else {
                    Dimensions::new(target, scale(src.height, target, src.width))
                }
            }
        }
    }
}

/// `value * target / reference`, rounded half away from zero, at least 1.
fn scale(value: u32, target: u32, reference: u32) -> u32 {
    let scaled = (value as f64 * target as f64 / reference as f64).round();
    (scaled as u32).max(1)
}

/// Compute the target dimensions of one thumbnail.
pub fn plan(src: Dimensions, size: ThumbSize, kind: MediaKind) -> Result<Dimensions> {
    if src.width == 0 || src.height == 0 {
        return Err(ThumbError::InvalidDimensions {
            width: src.width,
            height: src.height,
        });
    }

    let rule = FitRule::for_size(kind, size)
        .ok_or_else(|| ThumbError::Other(format!("no {} thumbnail for unsupported media", size)))?;

    Ok(rule.apply(src))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(w: u32, h: u32, size: ThumbSize) -> (u32, u32) {
        let d = plan(Dimensions::new(w, h), size, MediaKind::Photo).unwrap();
        (d.width, d.height)
    }

    fn video(w: u32, h: u32, size: ThumbSize) -> (u32, u32) {
        let d = plan(Dimensions::new(w, h), size, MediaKind::Video).unwrap();
        (d.width, d.height)
    }

    #[test]
    fn test_photo_landscape_12mp() {
        assert_eq!(photo(4032, 3024, ThumbSize::Sm), (320, 240));
        assert_eq!(photo(4032, 3024, ThumbSize::M), (427, 320));
        assert_eq!(photo(4032, 3024, ThumbSize::Xl), (1707, 1280));
    }

    #[test]
    fn test_photo_portrait_mirrors_landscape() {
        assert_eq!(photo(3024, 4032, ThumbSize::Sm), (240, 320));
        assert_eq!(photo(3024, 4032, ThumbSize::M), (320, 427));
        assert_eq!(photo(3024, 4032, ThumbSize::Xl), (1280, 1707));
    }

    #[test]
    fn test_photo_square() {
        assert_eq!(photo(2000, 2000, ThumbSize::Sm), (320, 320));
        assert_eq!(photo(2000, 2000, ThumbSize::M), (320, 320));
        assert_eq!(photo(2000, 2000, ThumbSize::Xl), (1280, 1280));
    }

    #[test]
    fn test_sm_and_m_use_different_edges() {
        // Same nominal 320 target, different results
        assert_ne!(photo(4032, 3024, ThumbSize::Sm), photo(4032, 3024, ThumbSize::M));
    }

    #[test]
    fn test_small_sources_are_not_upscaled() {
        assert_eq!(photo(300, 200, ThumbSize::Sm), (300, 200));
        assert_eq!(photo(640, 300, ThumbSize::M), (640, 300));
        assert_eq!(photo(1920, 1080, ThumbSize::Xl), (1920, 1080));
    }

    #[test]
    fn test_extreme_aspect_keeps_at_least_one_pixel() {
        assert_eq!(photo(10000, 10, ThumbSize::Sm), (320, 1));
    }

    #[test]
    fn test_aspect_ratio_preserved_within_rounding() {
        for &(w, h) in &[(4032, 3024), (6000, 4000), (1080, 1920), (5184, 3456), (4000, 3000)] {
            for size in ThumbSize::ALL {
                let (tw, th) = photo(w, h, size);
                let src_ratio = w as f64 / h as f64;
                // One pixel of rounding on the computed edge
                let lo = (tw as f64 - 0.5) / (th as f64 + 0.5);
                let hi = (tw as f64 + 0.5) / (th as f64 - 0.5);
                assert!(
                    src_ratio >= lo && src_ratio <= hi,
                    "{}x{} {} -> {}x{}",
                    w, h, size, tw, th
                );
            }
        }
    }

    #[test]
    fn test_video_full_hd() {
        assert_eq!(video(1920, 1080, ThumbSize::Sm), (427, 240));
        assert_eq!(video(1920, 1080, ThumbSize::M), (640, 360));
        assert_eq!(video(1920, 1080, ThumbSize::Xl), (1920, 1080));
    }

    #[test]
    fn test_video_portrait() {
        assert_eq!(video(1080, 1920, ThumbSize::Sm), (240, 427));
        assert_eq!(video(1080, 1920, ThumbSize::M), (360, 640));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let err = plan(Dimensions::new(0, 1080), ThumbSize::M, MediaKind::Photo).unwrap_err();
        assert!(matches!(err, ThumbError::InvalidDimensions { width: 0, height: 1080 }));
    }

    #[test]
    fn test_unsupported_kind_has_no_rule() {
        assert!(FitRule::for_size(MediaKind::Unsupported, ThumbSize::Sm).is_none());
        assert!(plan(Dimensions::new(100, 100), ThumbSize::Sm, MediaKind::Unsupported).is_err());
    }
}
