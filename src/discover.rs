// File and directory discovery

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::constants::EA_DIR_NAME;
use crate::error::Result;
use crate::metadata::MediaKind;

/// Photos and videos directly inside `dir` (not recursive), sorted by file name.
pub fn list_media_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_media_file(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Check if a file is a photo or video based on extension
pub fn is_media_file(path: &Path) -> bool {
    MediaKind::from_path(path).is_supported()
}

/// True for any directory literally named @eaDir
pub fn is_ea_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == EA_DIR_NAME
}

/// Every directory under `root` (root included), skipping @eaDir subtrees.
/// Symlinks are not followed.
pub fn walk_directories(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ea_dir(e))
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_media_file() {
        assert!(is_media_file(Path::new("IMG_0001.JPG")));
        assert!(is_media_file(Path::new("clip.Mp4")));
        assert!(is_media_file(Path::new("scan.TIF")));
        assert!(!is_media_file(Path::new("notes.txt")));
        assert!(!is_media_file(Path::new("audio.mp3")));
        assert!(!is_media_file(Path::new("SYNOPHOTO_THUMB_SM.fail")));
    }

    #[test]
    fn test_list_media_files_sorted_and_filtered() {
        let tmp = TempDir::new().unwrap();
        for name in ["b.mov", "a.JPG", "notes.txt", "c.heic"] {
            std::fs::write(tmp.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(tmp.path().join("sub.jpg")).unwrap();

        let names: Vec<String> = list_media_files(tmp.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a.JPG", "b.mov", "c.heic"]);
    }

    #[test]
    fn test_list_media_files_missing_dir_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(list_media_files(&tmp.path().join("missing")).is_err());
    }

    #[test]
    fn test_walk_skips_ea_dir() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("2023/summer/@eaDir/IMG_1.JPG")).unwrap();
        std::fs::create_dir_all(root.join("2024")).unwrap();
        std::fs::create_dir_all(root.join("@eaDir/nested")).unwrap();
        std::fs::write(root.join("2024/IMG_2.JPG"), b"x").unwrap();

        let dirs = walk_directories(root);

        assert_eq!(
            dirs,
            vec![
                root.to_path_buf(),
                root.join("2023"),
                root.join("2023/summer"),
                root.join("2024"),
            ]
        );
        assert!(dirs
            .iter()
            .all(|d| d.components().all(|c| c.as_os_str() != EA_DIR_NAME)));
    }

    #[test]
    fn test_ea_dir_match_is_exact() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("@eaDir-backup")).unwrap();
        std::fs::create_dir_all(tmp.path().join("@eadir")).unwrap();

        let dirs = walk_directories(tmp.path());
        assert_eq!(dirs.len(), 3);
    }
}
