// Per-size success/failure bookkeeping
//
// State lives only in the filesystem: a `.fail` file beside the thumbnail means
// the last attempt for that size failed. Once a size has been attempted, no
// `.fail` means the thumbnail is present. Synology Photos relies on this.

use std::fs::OpenOptions;
use std::io::ErrorKind;

use filetime::FileTime;

use crate::error::Result;
use crate::thumbs::{ThumbDir, ThumbSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbStatus {
    /// Never attempted: neither thumbnail nor sentinel
    Pending,
    /// Thumbnail present, no sentinel
    Ready,
    /// Sentinel present (a previous thumbnail may still sit beside it)
    Failed,
}

pub fn status(dir: &ThumbDir, size: ThumbSize) -> ThumbStatus {
    if dir.fail_path(size).is_file() {
        ThumbStatus::Failed
    } else if dir.has_thumb(size) {
        ThumbStatus::Ready
    } else {
        ThumbStatus::Pending
    }
}

/// Transition to Ready: drop the sentinel if there is one.
pub fn mark_ready(dir: &ThumbDir, size: ThumbSize) -> Result<()> {
    match std::fs::remove_file(dir.fail_path(size)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Transition to Failed: create the sentinel, or refresh its mtime.
pub fn mark_failed(dir: &ThumbDir, size: ThumbSize) -> Result<()> {
    std::fs::create_dir_all(dir.path())?;

    let fail_path = dir.fail_path(size);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&fail_path)?;
    filetime::set_file_mtime(&fail_path, FileTime::now())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn thumb_dir(tmp: &TempDir) -> ThumbDir {
        ThumbDir::for_media(&tmp.path().join("@eaDir"), Path::new("IMG_0001.JPG")).unwrap()
    }

    #[test]
    fn test_pending_then_failed_then_ready() {
        let tmp = TempDir::new().unwrap();
        let dir = thumb_dir(&tmp);

        assert_eq!(status(&dir, ThumbSize::M), ThumbStatus::Pending);

        // mark_failed creates the folder on demand
        mark_failed(&dir, ThumbSize::M).unwrap();
        assert!(dir.fail_path(ThumbSize::M).is_file());
        assert_eq!(status(&dir, ThumbSize::M), ThumbStatus::Failed);

        std::fs::write(dir.thumb_path(ThumbSize::M), b"jpeg").unwrap();
        assert_eq!(status(&dir, ThumbSize::M), ThumbStatus::Failed);

        mark_ready(&dir, ThumbSize::M).unwrap();
        assert!(!dir.fail_path(ThumbSize::M).exists());
        assert_eq!(status(&dir, ThumbSize::M), ThumbStatus::Ready);
    }

    #[test]
    fn test_mark_ready_without_sentinel_is_noop() {
        let tmp = TempDir::new().unwrap();
        let dir = thumb_dir(&tmp);
        mark_ready(&dir, ThumbSize::Sm).unwrap();
        assert!(!dir.path().exists());
    }

    #[test]
    fn test_mark_failed_twice_keeps_single_sentinel() {
        let tmp = TempDir::new().unwrap();
        let dir = thumb_dir(&tmp);
        mark_failed(&dir, ThumbSize::Xl).unwrap();
        mark_failed(&dir, ThumbSize::Xl).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(status(&dir, ThumbSize::Sm), ThumbStatus::Pending);
    }
}
