// Media classification and probed dimensions

pub mod probe;

use std::fmt;
use std::path::Path;

use crate::constants::{PHOTO_EXTENSIONS, VIDEO_EXTENSIONS};

/// How a file is handled, resolved once from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
    Unsupported,
}

impl MediaKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(e) => e.to_lowercase(),
            None => return MediaKind::Unsupported,
        };

        if PHOTO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Photo
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Unsupported
        }
    }

    pub fn is_supported(self) -> bool {
        self != MediaKind::Unsupported
    }
}

/// Pixel width x height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_landscape(&self) -> bool {
        self.width >= self.height
    }

    pub fn long_edge(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn short_edge(&self) -> u32 {
        self.width.min(self.height)
    }

    /// Width and height swapped, for sources displayed a quarter turn from storage.
    pub fn transposed(&self) -> Self {
        Self::new(self.height, self.width)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
