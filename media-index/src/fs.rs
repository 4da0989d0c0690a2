//! Filesystem access: media type detection, immediate directory listing and
//! recursive subfolder collection.
//!
//! Directory listing failures are reported as [`IndexError`] so callers can
//! decide; the `_or_empty` helpers log and swallow them.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cancel::CancelToken;
use crate::error::{IndexError, IndexResult};

pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];
pub const VIDEO_EXTENSIONS: [&str; 9] = [
    "mp4", "mkv", "avi", "wmv", "mov", "flv", "webm", "ogg", "ogv",
];

/// Kind of media a file extension denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Classifies a path by its (case-insensitive) extension.
pub fn media_kind(path: &Path) -> Option<MediaKind> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

pub fn is_media_file(path: &Path) -> bool {
    media_kind(path).is_some()
}

/// Best-effort MIME type from the extension
pub fn mime_type_for(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "wmv" => "video/x-ms-wmv",
        "mov" => "video/quicktime",
        "flv" => "video/x-flv",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",
        _ => "application/octet-stream",
    };
    mime.to_string()
}

/// A media file found directly inside a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: PathBuf,
    /// Epoch milliseconds, 0 when the platform does not report it
    pub last_modified: i64,
    pub kind: MediaKind,
}

fn modified_millis(meta: &fs::Metadata) -> i64 {
    meta.modified()
        .map(|t| DateTime::<Utc>::from(t).timestamp_millis())
        .unwrap_or(0)
}

/// Lists the supported media files directly inside `dir` (not recursive).
pub fn list_media_files(dir: &Path) -> IndexResult<Vec<FileInfo>> {
    let entries = fs::read_dir(dir).map_err(|e| IndexError::from_io(e, dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        let Some(kind) = media_kind(&path) else {
            continue;
        };
        // fs::metadata follows symlinks, so linked media files count too
        let meta = match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => continue,
            Err(e) => {
                log::debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        files.push(FileInfo {
            last_modified: modified_millis(&meta),
            path,
            kind,
        });
    }
    Ok(files)
}

/// Like [`list_media_files`] but treats every failure as an empty folder.
pub fn list_media_files_or_empty(dir: &Path) -> Vec<FileInfo> {
    match list_media_files(dir) {
        Ok(files) => files,
        Err(IndexError::NotFound(_)) => {
            log::debug!("Folder no longer exists: {}", dir.display());
            Vec::new()
        }
        Err(e) => {
            log::warn!("Could not list {}: {}", dir.display(), e);
            Vec::new()
        }
    }
}

/// Collects every folder below `root`, depth first. `root` itself is not included.
///
/// Folders that cannot be read are logged and skipped; the traversal continues.
pub fn collect_subfolders(root: &Path, cancel: &CancelToken) -> IndexResult<BTreeSet<String>> {
    let mut folders = BTreeSet::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        cancel.check()?;
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping inaccessible folder under {}: {}", root.display(), e);
                continue;
            }
        };
        if entry.file_type().is_dir() {
            folders.insert(entry.path().to_string_lossy().into_owned());
        }
    }

    Ok(folders)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_is_case_insensitive() {
        assert_eq!(media_kind(Path::new("/a/B.JPG")), Some(MediaKind::Image));
        assert_eq!(media_kind(Path::new("/a/clip.Mp4")), Some(MediaKind::Video));
        assert_eq!(media_kind(Path::new("/a/notes.txt")), None);
        assert_eq!(media_kind(Path::new("/a/no_extension")), None);
        assert_eq!(mime_type_for(Path::new("x.webm")), "video/webm");
    }

    #[test]
    fn test_list_media_files_filters_and_skips_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        fs::write(dir.path().join("b.mkv"), b"x").unwrap();
        fs::write(dir.path().join("c.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let mut names: Vec<_> = list_media_files(dir.path())
            .unwrap()
            .into_iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.jpg", "b.mkv"]);
    }

    #[test]
    fn test_missing_folder_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        assert!(matches!(
            list_media_files(&missing),
            Err(IndexError::NotFound(_))
        ));
        assert!(list_media_files_or_empty(&missing).is_empty());
    }

    #[test]
    fn test_collect_subfolders() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::create_dir_all(dir.path().join("d")).unwrap();
        fs::write(dir.path().join("a/file.jpg"), b"x").unwrap();

        let folders = collect_subfolders(dir.path(), &CancelToken::new()).unwrap();
        let rel: Vec<_> = folders
            .iter()
            .map(|f| {
                Path::new(f)
                    .strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(rel, vec!["a", "a/b", "a/b/c", "d"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_folder_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir_all(locked.join("inner")).unwrap();
        fs::create_dir_all(dir.path().join("open/deeper")).unwrap();
        fs::write(locked.join("a.jpg"), b"x").unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // privileged user, permissions are not enforced
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let folders = collect_subfolders(dir.path(), &CancelToken::new());
        let listing = list_media_files(&locked);
        let listing_or_empty = list_media_files_or_empty(&locked);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let folders = folders.unwrap();
        let s = |p: PathBuf| p.to_string_lossy().into_owned();
        assert!(folders.contains(&s(dir.path().join("open"))));
        assert!(folders.contains(&s(dir.path().join("open/deeper"))));
        assert!(!folders.contains(&s(locked.join("inner"))));
        assert!(matches!(listing, Err(IndexError::AccessDenied(_))));
        assert!(listing_or_empty.is_empty());
    }

    #[test]
    fn test_collect_subfolders_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(matches!(
            collect_subfolders(dir.path(), &cancel),
            Err(IndexError::Cancelled)
        ));
    }
}
