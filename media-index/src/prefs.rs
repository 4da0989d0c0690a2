//! Persisted user choices: which folders or buckets are shown and which image
//! was viewed last.
//!
//! Storage sits behind [`PreferenceStore`]; the typed views here only know key
//! names and defaults.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::{IndexError, IndexResult};
use crate::models::{SelectionKind, VisibilityPreference};

/// Key-value storage for preferences. Each call is atomic on its own;
/// read-modify-write sequences are not.
pub trait PreferenceStore: Send + Sync {
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn set_bool(&self, key: &str, value: bool) -> IndexResult<()>;

    fn get_i64(&self, key: &str) -> Option<i64>;
    fn set_i64(&self, key: &str, value: i64) -> IndexResult<()>;

    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&self, key: &str, value: &str) -> IndexResult<()>;

    fn get_string_set(&self, key: &str) -> Option<HashSet<String>>;
    fn set_string_set(&self, key: &str, value: &HashSet<String>) -> IndexResult<()>;

    fn remove(&self, key: &str) -> IndexResult<()>;
    fn clear(&self) -> IndexResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
enum PrefValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Set(HashSet<String>),
}

/// Process-local store, for tests and for runs without a database
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, PrefValue>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: PrefValue) -> IndexResult<()> {
        self.values
            .lock()
            .map_err(|_| IndexError::Preferences("preference lock poisoned".to_string()))?
            .insert(key.to_string(), value);
        Ok(())
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            PrefValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    fn set_bool(&self, key: &str, value: bool) -> IndexResult<()> {
        self.put(key, PrefValue::Bool(value))
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            PrefValue::Int(v) => Some(v),
            _ => None,
        }
    }

    fn set_i64(&self, key: &str, value: i64) -> IndexResult<()> {
        self.put(key, PrefValue::Int(value))
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            PrefValue::Str(v) => Some(v),
            _ => None,
        }
    }

    fn set_string(&self, key: &str, value: &str) -> IndexResult<()> {
        self.put(key, PrefValue::Str(value.to_string()))
    }

    fn get_string_set(&self, key: &str) -> Option<HashSet<String>> {
        match self.get(key)? {
            PrefValue::Set(v) => Some(v),
            _ => None,
        }
    }

    fn set_string_set(&self, key: &str, value: &HashSet<String>) -> IndexResult<()> {
        self.put(key, PrefValue::Set(value.clone()))
    }

    fn remove(&self, key: &str) -> IndexResult<()> {
        self.values
            .lock()
            .map_err(|_| IndexError::Preferences("preference lock poisoned".to_string()))?
            .remove(key);
        Ok(())
    }

    fn clear(&self) -> IndexResult<()> {
        self.values
            .lock()
            .map_err(|_| IndexError::Preferences("preference lock poisoned".to_string()))?
            .clear();
        Ok(())
    }
}

pub mod keys {
    pub const FOLDER_FIRST_LAUNCH: &str = "folder_prefs.first_launch";
    pub const SHOW_ALL_FOLDERS: &str = "folder_prefs.show_all_folders";
    pub const SELECTED_FOLDERS: &str = "folder_prefs.selected_folders";

    pub const ALBUM_FIRST_LAUNCH: &str = "album_prefs.first_launch";
    pub const SHOW_ALL_ALBUMS: &str = "album_prefs.show_all_albums";
    pub const SELECTED_BUCKET_IDS: &str = "album_prefs.selected_bucket_ids";

    pub const LAST_IMAGE_PATH: &str = "last_image.path";
    pub const LAST_IMAGE_POSITION: &str = "last_image.position";
    pub const LAST_IMAGE_TIMESTAMP: &str = "last_image.timestamp";
    pub const RESUME_ENABLED: &str = "last_image.resume_enabled";
}

/// Show-all flag plus an allow-set, stored under three keys
#[derive(Clone)]
struct Selection {
    store: Arc<dyn PreferenceStore>,
    first_launch_key: &'static str,
    show_all_key: &'static str,
    set_key: &'static str,
    kind: SelectionKind,
}

impl Selection {
    fn is_first_launch(&self) -> bool {
        self.store.get_bool(self.first_launch_key).unwrap_or(true)
    }

    fn complete_first_launch(&self) -> IndexResult<()> {
        self.store.set_bool(self.first_launch_key, false)
    }

    fn show_all(&self) -> bool {
        self.store.get_bool(self.show_all_key).unwrap_or(true)
    }

    fn set_show_all(&self, show_all: bool) -> IndexResult<()> {
        self.store.set_bool(self.show_all_key, show_all)
    }

    fn selected(&self) -> HashSet<String> {
        self.store.get_string_set(self.set_key).unwrap_or_default()
    }

    fn set_selected(&self, values: &HashSet<String>) -> IndexResult<()> {
        self.store.set_string_set(self.set_key, values)
    }

    fn add<I: IntoIterator<Item = String>>(&self, values: I) -> IndexResult<()> {
        let mut set = self.selected();
        set.extend(values);
        self.set_selected(&set)
    }

    fn remove(&self, value: &str) -> IndexResult<()> {
        let mut set = self.selected();
        if set.remove(value) {
            self.set_selected(&set)?;
        }
        Ok(())
    }

    fn visibility(&self) -> VisibilityPreference {
        if self.show_all() {
            VisibilityPreference::show_all(self.kind)
        } else {
            VisibilityPreference::only(self.kind, self.selected())
        }
    }
}

/// Folder-path based selection
#[derive(Clone)]
pub struct FolderSelection(Selection);

impl FolderSelection {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self(Selection {
            store,
            first_launch_key: keys::FOLDER_FIRST_LAUNCH,
            show_all_key: keys::SHOW_ALL_FOLDERS,
            set_key: keys::SELECTED_FOLDERS,
            kind: SelectionKind::FolderPath,
        })
    }

    pub fn is_first_launch(&self) -> bool {
        self.0.is_first_launch()
    }

    pub fn complete_first_launch(&self) -> IndexResult<()> {
        self.0.complete_first_launch()
    }

    pub fn show_all(&self) -> bool {
        self.0.show_all()
    }

    pub fn set_show_all(&self, show_all: bool) -> IndexResult<()> {
        self.0.set_show_all(show_all)
    }

    pub fn selected_folders(&self) -> HashSet<String> {
        self.0.selected()
    }

    pub fn set_selected_folders(&self, folders: &HashSet<String>) -> IndexResult<()> {
        self.0.set_selected(folders)
    }

    pub fn add_folders<I: IntoIterator<Item = String>>(&self, folders: I) -> IndexResult<()> {
        self.0.add(folders)
    }

    pub fn remove_folder(&self, folder: &str) -> IndexResult<()> {
        self.0.remove(folder)
    }

    pub fn is_selected(&self, folder: &str) -> bool {
        self.0.selected().contains(folder)
    }

    pub fn visibility(&self) -> VisibilityPreference {
        self.0.visibility()
    }
}

/// Bucket-id based selection
#[derive(Clone)]
pub struct AlbumSelection(Selection);

impl AlbumSelection {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self(Selection {
            store,
            first_launch_key: keys::ALBUM_FIRST_LAUNCH,
            show_all_key: keys::SHOW_ALL_ALBUMS,
            set_key: keys::SELECTED_BUCKET_IDS,
            kind: SelectionKind::BucketId,
        })
    }

    pub fn is_first_launch(&self) -> bool {
        self.0.is_first_launch()
    }

    pub fn complete_first_launch(&self) -> IndexResult<()> {
        self.0.complete_first_launch()
    }

    pub fn show_all(&self) -> bool {
        self.0.show_all()
    }

    pub fn set_show_all(&self, show_all: bool) -> IndexResult<()> {
        self.0.set_show_all(show_all)
    }

    pub fn selected_bucket_ids(&self) -> HashSet<String> {
        self.0.selected()
    }

    pub fn set_selected_bucket_ids(&self, ids: &HashSet<String>) -> IndexResult<()> {
        self.0.set_selected(ids)
    }

    pub fn add_bucket_ids<I: IntoIterator<Item = String>>(&self, ids: I) -> IndexResult<()> {
        self.0.add(ids)
    }

    pub fn remove_bucket_id(&self, id: &str) -> IndexResult<()> {
        self.0.remove(id)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.0.selected().contains(id)
    }

    pub fn visibility(&self) -> VisibilityPreference {
        self.0.visibility()
    }
}

/// Carries a folder-path selection over to bucket ids.
///
/// Folders with no known bucket are dropped. Returns how many ids were stored.
pub fn migrate_folder_selection(
    folders: &FolderSelection,
    albums: &AlbumSelection,
    folder_to_bucket: &HashMap<String, String>,
) -> IndexResult<usize> {
    albums.set_show_all(folders.show_all())?;

    let ids: HashSet<String> = folders
        .selected_folders()
        .iter()
        .filter_map(|folder| folder_to_bucket.get(folder).cloned())
        .collect();
    albums.set_selected_bucket_ids(&ids)?;
    albums.complete_first_launch()?;

    log::info!("Migrated folder selection to {} bucket ids", ids.len());
    Ok(ids.len())
}

/// The image to reopen on the next launch
#[derive(Clone)]
pub struct LastImage {
    store: Arc<dyn PreferenceStore>,
}

impl LastImage {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn save(&self, path: &str, position: usize) -> IndexResult<()> {
        self.store.set_string(keys::LAST_IMAGE_PATH, path)?;
        self.store
            .set_i64(keys::LAST_IMAGE_POSITION, position as i64)?;
        self.store.set_i64(
            keys::LAST_IMAGE_TIMESTAMP,
            chrono::Utc::now().timestamp_millis(),
        )
    }

    pub fn path(&self) -> Option<String> {
        self.store
            .get_string(keys::LAST_IMAGE_PATH)
            .filter(|p| !p.is_empty())
    }

    pub fn position(&self) -> usize {
        self.store
            .get_i64(keys::LAST_IMAGE_POSITION)
            .and_then(|p| usize::try_from(p).ok())
            .unwrap_or(0)
    }

    /// Epoch milliseconds of the last save, 0 if never saved
    pub fn timestamp(&self) -> i64 {
        self.store.get_i64(keys::LAST_IMAGE_TIMESTAMP).unwrap_or(0)
    }

    pub fn is_resume_enabled(&self) -> bool {
        self.store.get_bool(keys::RESUME_ENABLED).unwrap_or(true)
    }

    pub fn set_resume_enabled(&self, enabled: bool) -> IndexResult<()> {
        self.store.set_bool(keys::RESUME_ENABLED, enabled)
    }

    pub fn clear(&self) -> IndexResult<()> {
        self.store.remove(keys::LAST_IMAGE_PATH)?;
        self.store.remove(keys::LAST_IMAGE_POSITION)?;
        self.store.remove(keys::LAST_IMAGE_TIMESTAMP)
    }

    /// A path is stored and the file is still there.
    pub fn has_last_image(&self) -> bool {
        self.path().is_some_and(|p| Path::new(&p).exists())
    }
}
