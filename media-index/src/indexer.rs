//! Album discovery.
//!
//! Two strategies: lazy cover mode ([`AlbumIndexer::build_covers`]) reads the
//! catalog only to learn which folders exist, then picks one cover per visible
//! folder from the filesystem; full bucket mode
//! ([`AlbumIndexer::build_album_folders`]) groups every catalog entry by
//! bucket with counts.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::catalog::CatalogAdapter;
use crate::error::IndexResult;
use crate::fs::{list_media_files_or_empty, FileInfo};
use crate::models::{
    folder_of, AlbumFolder, MediaEntry, MediaListing, Photo, SelectionKind, VisibilityPreference,
};
use crate::natural::{compare_files, compare_folders, natural_cmp};
use crate::visibility::VisibilityFilter;

pub use crate::fs::collect_subfolders;

pub struct AlbumIndexer {
    catalog: Arc<CatalogAdapter>,
    filter: VisibilityFilter,
}

impl AlbumIndexer {
    pub fn new(catalog: Arc<CatalogAdapter>, filter: VisibilityFilter) -> Self {
        Self { catalog, filter }
    }

    pub fn catalog(&self) -> &CatalogAdapter {
        &self.catalog
    }

    pub fn filter(&self) -> VisibilityFilter {
        self.filter
    }

    fn all_entries(&self) -> Vec<MediaEntry> {
        let mut entries = self.catalog.list_images();
        entries.extend(self.catalog.list_videos());
        entries
    }

    /// What the visibility filter is asked about for an entry
    fn candidate<'a>(entry: &'a MediaEntry, folder: &'a str, pref: &VisibilityPreference) -> &'a str {
        match pref.kind {
            SelectionKind::FolderPath => folder,
            SelectionKind::BucketId => &entry.bucket_id,
        }
    }

    /// Lazy cover mode: every visible, non-empty folder mapped to a
    /// single-element list holding its most recently modified file.
    pub fn build_covers(
        &self,
        pref: &VisibilityPreference,
        cancel: &CancelToken,
    ) -> IndexResult<BTreeMap<String, Vec<Photo>>> {
        let mut candidates: HashMap<String, String> = HashMap::new();
        for entry in self.all_entries() {
            let Some(folder) = entry.folder() else {
                continue;
            };
            candidates
                .entry(folder)
                .or_insert_with(|| entry.bucket_id.clone());
        }
        log::debug!("Cover scan over {} candidate folders", candidates.len());

        let mut covers = BTreeMap::new();
        for (folder, bucket_id) in candidates {
            cancel.check()?;

            let candidate = match pref.kind {
                SelectionKind::FolderPath => folder.as_str(),
                SelectionKind::BucketId => bucket_id.as_str(),
            };
            if !self.filter.is_visible(candidate, pref) {
                continue;
            }

            if let Some(cover) = pick_cover(list_media_files_or_empty(Path::new(&folder))) {
                let path = cover.path.to_string_lossy().into_owned();
                covers.insert(folder, vec![Photo::new(path)]);
            }
        }

        log::info!("Built {} album covers", covers.len());
        Ok(covers)
    }

    /// Full bucket mode: one album per bucket id, first-seen entry as cover,
    /// sorted by display name in natural order.
    pub fn build_album_folders(
        &self,
        pref: &VisibilityPreference,
        cancel: &CancelToken,
    ) -> IndexResult<Vec<AlbumFolder>> {
        let mut albums: Vec<AlbumFolder> = Vec::new();
        let mut by_bucket: HashMap<String, usize> = HashMap::new();

        let images = self.catalog.list_images();
        let videos = self.catalog.list_videos();
        for entry in images.iter().chain(videos.iter()) {
            cancel.check()?;

            let Some(folder) = entry.folder() else {
                log::debug!("Skipping entry without folder: {}", entry.path);
                continue;
            };
            if !self
                .filter
                .is_visible(Self::candidate(entry, &folder, pref), pref)
            {
                continue;
            }

            match by_bucket.get(&entry.bucket_id) {
                Some(&idx) => albums[idx].item_count += 1,
                None => {
                    by_bucket.insert(entry.bucket_id.clone(), albums.len());
                    albums.push(AlbumFolder::from_cover(entry, folder));
                }
            }
        }

        albums.sort_by(|a, b| natural_cmp(&a.name, &b.name).then_with(|| a.path.cmp(&b.path)));
        log::info!("Indexed {} albums", albums.len());
        Ok(albums)
    }

    /// Every catalog image and video, most recently modified first, with the
    /// catalog's bucket id for each folder.
    ///
    /// The modification time comes from the file when it can be read, else
    /// from the catalog's date added.
    pub fn load_all_media(&self) -> MediaListing {
        let mut buckets: HashMap<String, String> = HashMap::new();
        let mut dated: Vec<(i64, String)> = Vec::new();
        for entry in self.all_entries() {
            if let Some(folder) = entry.folder() {
                buckets
                    .entry(folder)
                    .or_insert_with(|| entry.bucket_id.clone());
            }
            let modified = std::fs::metadata(&entry.path)
                .and_then(|m| m.modified())
                .map(|t| chrono::DateTime::<chrono::Utc>::from(t).timestamp_millis())
                .unwrap_or(entry.date_added * 1000);
            dated.push((modified, entry.path));
        }

        dated.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        dated.dedup_by(|a, b| a.1 == b.1);
        let photos = dated
            .into_iter()
            .enumerate()
            .map(|(idx, (_, path))| Photo::at(path, idx))
            .collect();
        MediaListing { photos, buckets }
    }
}

/// Greatest modification time wins; equal times go to the naturally first name.
fn pick_cover(files: Vec<FileInfo>) -> Option<FileInfo> {
    files.into_iter().max_by(|a, b| {
        a.last_modified
            .cmp(&b.last_modified)
            .then_with(|| compare_files(&b.path, &a.path))
            .then_with(|| b.path.cmp(&a.path))
    })
}

/// Media files directly inside `folder`, in natural order.
///
/// Missing or unreadable folders give an empty list.
pub fn get_images_from_album(folder: &Path) -> Vec<Photo> {
    let mut files = list_media_files_or_empty(folder);
    files.sort_by(|a, b| compare_files(&a.path, &b.path).then_with(|| a.path.cmp(&b.path)));
    files
        .into_iter()
        .map(|f| Photo::new(f.path.to_string_lossy().into_owned()))
        .collect()
}

/// Number of image and video files directly inside `folder`
pub fn count_media(folder: &Path) -> usize {
    list_media_files_or_empty(folder).len()
}

/// Groups photos by parent folder; photos without a parent are skipped.
pub fn group_by_folder(photos: &[Photo]) -> BTreeMap<String, Vec<Photo>> {
    let mut groups: BTreeMap<String, Vec<Photo>> = BTreeMap::new();
    for photo in photos {
        match photo.folder() {
            Some(folder) => groups.entry(folder).or_default().push(photo.clone()),
            None => log::debug!("No parent folder for {}", photo.path),
        }
    }
    groups
}

/// Distinct parent folders of `photos`, in natural folder order.
pub fn list_all_folders(photos: &[Photo]) -> Vec<String> {
    let folders: BTreeSet<String> = photos.iter().filter_map(|p| folder_of(&p.path)).collect();
    let mut folders: Vec<String> = folders.into_iter().collect();
    folders.sort_by(|a, b| compare_folders(Path::new(a), Path::new(b)).then_with(|| a.cmp(b)));
    folders
}
