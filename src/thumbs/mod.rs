// Thumbnail artifacts - @eaDir layout
//
// <dir>/@eaDir/<original-filename>/SYNOPHOTO_THUMB_{SM,M,XL}.jpg
// plus a sibling SYNOPHOTO_THUMB_<SIZE>.fail while that size is failed.

pub mod plan;
pub mod render;
pub mod sentinel;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::{FAIL_EXTENSION, THUMB_EXTENSION, THUMB_PREFIX};

/// The three thumbnail classes Synology Photos expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThumbSize {
    Sm,
    M,
    Xl,
}

impl ThumbSize {
    pub const ALL: [ThumbSize; 3] = [ThumbSize::Sm, ThumbSize::M, ThumbSize::Xl];

    /// Suffix used in file names
    pub fn label(self) -> &'static str {
        match self {
            ThumbSize::Sm => "SM",
            ThumbSize::M => "M",
            ThumbSize::Xl => "XL",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}{}.{}", THUMB_PREFIX, self.label(), THUMB_EXTENSION)
    }

    pub fn fail_file_name(self) -> String {
        format!("{}{}.{}", THUMB_PREFIX, self.label(), FAIL_EXTENSION)
    }
}

impl fmt::Display for ThumbSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-media-file artifact folder inside an @eaDir root.
#[derive(Debug, Clone)]
pub struct ThumbDir {
    dir: PathBuf,
}

impl ThumbDir {
    /// `@eaDir/<file name>` for `media_path`.
    pub fn for_media(ea_dir: &Path, media_path: &Path) -> Option<Self> {
        let name = media_path.file_name()?;
        Some(Self {
            dir: ea_dir.join(name),
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn thumb_path(&self, size: ThumbSize) -> PathBuf {
        self.dir.join(size.file_name())
    }

    pub fn fail_path(&self, size: ThumbSize) -> PathBuf {
        self.dir.join(size.fail_file_name())
    }

    pub fn has_thumb(&self, size: ThumbSize) -> bool {
        self.thumb_path(size).is_file()
    }
}
