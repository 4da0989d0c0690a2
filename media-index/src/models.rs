use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// A single image or video row as reported by the media catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaEntry {
    pub id: i64,
    pub path: String,
    pub bucket_id: String,
    pub bucket_name: String,
    /// Epoch seconds
    pub date_added: i64,
    pub mime_type: String,
    pub is_video: bool,
}

impl MediaEntry {
    /// Parent folder of the entry, if the path has one
    pub fn folder(&self) -> Option<String> {
        folder_of(&self.path)
    }
}

/// An album grouped by catalog bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlbumFolder {
    pub bucket_id: String,
    pub name: String,
    pub path: String,
    pub cover_path: String,
    pub cover_id: i64,
    pub item_count: usize,
}

impl AlbumFolder {
    /// Starts an album from the first entry seen for its bucket.
    pub fn from_cover(entry: &MediaEntry, folder: String) -> Self {
        Self {
            bucket_id: entry.bucket_id.clone(),
            name: entry.bucket_name.clone(),
            path: folder,
            cover_path: entry.path.clone(),
            cover_id: entry.id,
            item_count: 1,
        }
    }
}

/// Display record handed to the UI layer.
///
/// `position` only means something relative to the list the photo came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Photo {
    pub path: String,
    pub position: usize,
    pub selected: bool,
}

impl Photo {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            position: 0,
            selected: false,
        }
    }

    pub fn at(path: impl Into<String>, position: usize) -> Self {
        Self {
            path: path.into(),
            position,
            selected: false,
        }
    }

    /// File name without its extension
    pub fn stem(&self) -> String {
        Path::new(&self.path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn folder(&self) -> Option<String> {
        folder_of(&self.path)
    }
}

/// The global listing, newest first, with the bucket id the catalog
/// reported for each folder in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaListing {
    pub photos: Vec<Photo>,
    pub buckets: HashMap<String, String>,
}

impl MediaListing {
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn bucket_of(&self, folder: &str) -> Option<&str> {
        self.buckets.get(folder).map(String::as_str)
    }
}

impl From<Vec<Photo>> for MediaListing {
    fn from(photos: Vec<Photo>) -> Self {
        Self {
            photos,
            buckets: HashMap::new(),
        }
    }
}

/// What the members of a visibility allow-set refer to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    /// Absolute folder paths; selecting a folder includes its subfolders
    #[default]
    FolderPath,
    /// Opaque catalog bucket ids; exact membership only
    BucketId,
}

/// The user's choice of which folders or buckets are shown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisibilityPreference {
    pub show_all: bool,
    pub allow_set: HashSet<String>,
    pub kind: SelectionKind,
}

impl VisibilityPreference {
    pub fn show_all(kind: SelectionKind) -> Self {
        Self {
            show_all: true,
            allow_set: HashSet::new(),
            kind,
        }
    }

    pub fn only<I, S>(kind: SelectionKind, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            show_all: false,
            allow_set: allowed.into_iter().map(Into::into).collect(),
            kind,
        }
    }
}

impl Default for VisibilityPreference {
    fn default() -> Self {
        Self::show_all(SelectionKind::FolderPath)
    }
}

/// Catalog ordering on the "date added" column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Parent folder of a path as a string
pub fn folder_of(path: &str) -> Option<String> {
    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_string_lossy().into_owned())
}

/// Change between two photo lists, keyed by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoDiff {
    pub inserted: Vec<String>,
    pub removed: Vec<String>,
    /// Same path, only the selection flag changed
    pub selection_changed: Vec<String>,
    /// Same path, position changed
    pub moved: Vec<String>,
}

impl PhotoDiff {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty()
            && self.removed.is_empty()
            && self.selection_changed.is_empty()
            && self.moved.is_empty()
    }
}

/// Diffs two lists using the path as item identity.
pub fn diff_photos(old: &[Photo], new: &[Photo]) -> PhotoDiff {
    use std::collections::HashMap;

    let before: HashMap<&str, &Photo> = old.iter().map(|p| (p.path.as_str(), p)).collect();
    let after: HashMap<&str, &Photo> = new.iter().map(|p| (p.path.as_str(), p)).collect();

    let mut diff = PhotoDiff::default();
    for photo in new {
        match before.get(photo.path.as_str()) {
            None => diff.inserted.push(photo.path.clone()),
            Some(prev) => {
                if prev.selected != photo.selected {
                    diff.selection_changed.push(photo.path.clone());
                }
                if prev.position != photo.position {
                    diff.moved.push(photo.path.clone());
                }
            }
        }
    }
    for photo in old {
        if !after.contains_key(photo.path.as_str()) {
            diff.removed.push(photo.path.clone());
        }
    }
    diff
}

pub fn select_all(photos: &mut [Photo]) {
    photos.iter_mut().for_each(|p| p.selected = true);
}

pub fn clear_selection(photos: &mut [Photo]) {
    photos.iter_mut().for_each(|p| p.selected = false);
}

/// Flips the selection of one photo. Returns the new state, or `None` when out of range.
pub fn toggle_selection(photos: &mut [Photo], index: usize) -> Option<bool> {
    let photo = photos.get_mut(index)?;
    photo.selected = !photo.selected;
    Some(photo.selected)
}

pub fn selected_paths(photos: &[Photo]) -> Vec<String> {
    photos
        .iter()
        .filter(|p| p.selected)
        .map(|p| p.path.clone())
        .collect()
}
