//! Media catalog access.
//!
//! [`MediaCatalog`] is the seam to the platform media index. Two
//! implementations ship with the crate: [`SqliteCatalog`] reads a MediaStore
//! style table, [`FilesystemCatalog`] synthesises entries by walking folders.
//! [`CatalogAdapter`] is what the rest of the crate talks to; it never fails
//! and turns an unavailable catalog into an empty listing.

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

use crate::cancel::CancelToken;
use crate::error::{IndexError, IndexResult};
use crate::fs::{media_kind, mime_type_for, MediaKind};
use crate::models::{folder_of, MediaEntry, SortOrder};

/// Abstract provider of image and video rows
pub trait MediaCatalog: Send + Sync {
    fn list_images(&self, order: SortOrder) -> IndexResult<Vec<MediaEntry>>;

    fn list_videos(&self, order: SortOrder) -> IndexResult<Vec<MediaEntry>>;

    /// Images and videos whose bucket is in `bucket_ids`, newest first.
    fn list_entries_for_buckets(&self, bucket_ids: &HashSet<String>)
        -> IndexResult<Vec<MediaEntry>>;
}

impl<T: MediaCatalog + ?Sized> MediaCatalog for std::sync::Arc<T> {
    fn list_images(&self, order: SortOrder) -> IndexResult<Vec<MediaEntry>> {
        (**self).list_images(order)
    }

    fn list_videos(&self, order: SortOrder) -> IndexResult<Vec<MediaEntry>> {
        (**self).list_videos(order)
    }

    fn list_entries_for_buckets(
        &self,
        bucket_ids: &HashSet<String>,
    ) -> IndexResult<Vec<MediaEntry>> {
        (**self).list_entries_for_buckets(bucket_ids)
    }
}

/// Sorts entries by date added, keeping catalog order for equal timestamps.
fn sort_by_date(entries: &mut [MediaEntry], order: SortOrder) {
    match order {
        SortOrder::NewestFirst => entries.sort_by(|a, b| b.date_added.cmp(&a.date_added)),
        SortOrder::OldestFirst => entries.sort_by(|a, b| a.date_added.cmp(&b.date_added)),
    }
}

/// Bucket id the way the platform derives it: the Java `String.hashCode` of
/// the lower-cased folder path.
pub fn bucket_id_for(folder: &str) -> String {
    let hash = folder
        .to_lowercase()
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32));
    hash.to_string()
}

/// Catalog backed by a SQLite `media` table (see [`crate::schema`]).
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    pub fn new(conn: Connection) -> IndexResult<Self> {
        crate::schema::init_catalog_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open(path: &Path) -> IndexResult<Self> {
        Self::new(Connection::open(path)?)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> IndexResult<T>) -> IndexResult<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| IndexError::CatalogUnavailable("catalog lock poisoned".to_string()))?;
        f(&conn)
    }

    fn query_kind(&self, kind: &str, order: SortOrder) -> IndexResult<Vec<MediaEntry>> {
        let direction = match order {
            SortOrder::NewestFirst => "DESC",
            SortOrder::OldestFirst => "ASC",
        };
        let sql = format!(
            "SELECT _id, _data, bucket_id, bucket_display_name, date_added, mime_type, media_type
             FROM media
             WHERE media_type = ?1
             ORDER BY date_added {direction}, _id {direction}"
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![kind], read_row)?;
            collect_valid(rows)
        })
    }

    /// Inserts or refreshes the row for `entry.path`. Returns the row id.
    pub fn upsert(&self, entry: &MediaEntry) -> IndexResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO media (_data, bucket_id, bucket_display_name, date_added, mime_type, media_type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(_data) DO UPDATE SET
                    bucket_id = excluded.bucket_id,
                    bucket_display_name = excluded.bucket_display_name,
                    date_added = excluded.date_added,
                    mime_type = excluded.mime_type,
                    media_type = excluded.media_type",
                params![
                    entry.path,
                    entry.bucket_id,
                    entry.bucket_name,
                    entry.date_added,
                    entry.mime_type,
                    if entry.is_video { "video" } else { "image" },
                ],
            )?;
            let id: Option<i64> = conn
                .query_row(
                    "SELECT _id FROM media WHERE _data = ?1",
                    params![entry.path],
                    |row| row.get(0),
                )
                .optional()?;
            id.ok_or_else(|| IndexError::MalformedEntry(entry.path.clone()))
        })
    }

    /// Drops rows whose file no longer exists. Returns how many were removed.
    pub fn remove_missing(&self) -> IndexResult<usize> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT _id, _data FROM media")?;
            let stale: Vec<i64> = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
                })?
                .filter_map(|r| r.ok())
                .filter(|(_, path)| path.as_deref().map_or(true, |p| !Path::new(p).exists()))
                .map(|(id, _)| id)
                .collect();

            for id in &stale {
                conn.execute("DELETE FROM media WHERE _id = ?1", params![id])?;
            }
            Ok(stale.len())
        })
    }

    pub fn count(&self) -> IndexResult<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM media", [], |row| row.get(0))?)
        })
    }
}

type RawRow = (
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    i64,
    Option<String>,
    String,
);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn into_entry(raw: RawRow) -> IndexResult<MediaEntry> {
    let (id, path, bucket_id, bucket_name, date_added, mime_type, media_type) = raw;
    match (path, bucket_id, bucket_name) {
        (Some(path), Some(bucket_id), Some(bucket_name)) => Ok(MediaEntry {
            id,
            path,
            bucket_id,
            bucket_name,
            date_added,
            mime_type: mime_type.unwrap_or_default(),
            is_video: media_type == "video",
        }),
        _ => Err(IndexError::MalformedEntry(format!("row {}", id))),
    }
}

fn collect_valid<I>(rows: I) -> IndexResult<Vec<MediaEntry>>
where
    I: Iterator<Item = rusqlite::Result<RawRow>>,
{
    let mut entries = Vec::new();
    for row in rows {
        match into_entry(row?) {
            Ok(entry) => entries.push(entry),
            Err(e) => log::debug!("Dropping catalog row: {}", e),
        }
    }
    Ok(entries)
}

impl MediaCatalog for SqliteCatalog {
    fn list_images(&self, order: SortOrder) -> IndexResult<Vec<MediaEntry>> {
        self.query_kind("image", order)
    }

    fn list_videos(&self, order: SortOrder) -> IndexResult<Vec<MediaEntry>> {
        self.query_kind("video", order)
    }

    fn list_entries_for_buckets(
        &self,
        bucket_ids: &HashSet<String>,
    ) -> IndexResult<Vec<MediaEntry>> {
        if bucket_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; bucket_ids.len()].join(",");
        let sql = format!(
            "SELECT _id, _data, bucket_id, bucket_display_name, date_added, mime_type, media_type
             FROM media
             WHERE bucket_id IN ({placeholders})
             ORDER BY CASE media_type WHEN 'image' THEN 0 ELSE 1 END, date_added DESC, _id DESC"
        );
        let mut entries = self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(bucket_ids.iter()), read_row)?;
            collect_valid(rows)
        })?;
        sort_by_date(&mut entries, SortOrder::NewestFirst);
        Ok(entries)
    }
}

/// Catalog synthesised from a walk of the given root folders.
///
/// Used when no platform index is available, or as a fallback after the
/// primary catalog failed.
#[derive(Debug, Clone)]
pub struct FilesystemCatalog {
    roots: Vec<PathBuf>,
}

impl FilesystemCatalog {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Walks every root and returns all supported media files as entries.
    ///
    /// `cancel` is checked before each walked path.
    pub fn scan(&self, cancel: &CancelToken) -> IndexResult<Vec<MediaEntry>> {
        let mut entries = Vec::new();
        for root in &self.roots {
            for entry in WalkDir::new(root).follow_links(false) {
                cancel.check()?;
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        log::warn!("Filesystem catalog walk error: {}", e);
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                let Some(kind) = media_kind(path) else {
                    continue;
                };
                let path_str = path.to_string_lossy().into_owned();
                let Some(folder) = folder_of(&path_str) else {
                    continue;
                };
                let bucket_name = Path::new(&folder)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| folder.clone());
                let date_added = entry
                    .metadata()
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .map(|t| chrono::DateTime::<chrono::Utc>::from(t).timestamp())
                    .unwrap_or(0);

                entries.push(MediaEntry {
                    id: entries.len() as i64 + 1,
                    bucket_id: bucket_id_for(&folder),
                    bucket_name,
                    date_added,
                    mime_type: mime_type_for(path),
                    is_video: kind == MediaKind::Video,
                    path: path_str,
                });
            }
        }
        Ok(entries)
    }

    fn of_kind(&self, video: bool, order: SortOrder) -> IndexResult<Vec<MediaEntry>> {
        let mut entries: Vec<_> = self
            .scan(&CancelToken::new())?
            .into_iter()
            .filter(|e| e.is_video == video)
            .collect();
        sort_by_date(&mut entries, order);
        Ok(entries)
    }
}

impl MediaCatalog for FilesystemCatalog {
    fn list_images(&self, order: SortOrder) -> IndexResult<Vec<MediaEntry>> {
        self.of_kind(false, order)
    }

    fn list_videos(&self, order: SortOrder) -> IndexResult<Vec<MediaEntry>> {
        self.of_kind(true, order)
    }

    fn list_entries_for_buckets(
        &self,
        bucket_ids: &HashSet<String>,
    ) -> IndexResult<Vec<MediaEntry>> {
        let mut entries: Vec<_> = self
            .scan(&CancelToken::new())?
            .into_iter()
            .filter(|e| bucket_ids.contains(&e.bucket_id))
            .collect();
        sort_by_date(&mut entries, SortOrder::NewestFirst);
        Ok(entries)
    }
}

/// Error-absorbing front for a catalog, with an optional fallback.
pub struct CatalogAdapter {
    primary: Box<dyn MediaCatalog>,
    fallback: Option<Box<dyn MediaCatalog>>,
}

impl CatalogAdapter {
    pub fn new(primary: Box<dyn MediaCatalog>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    /// Queries `fallback` whenever the primary catalog fails.
    pub fn with_fallback(mut self, fallback: Box<dyn MediaCatalog>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    fn query<F>(&self, what: &str, f: F) -> Vec<MediaEntry>
    where
        F: Fn(&dyn MediaCatalog) -> IndexResult<Vec<MediaEntry>>,
    {
        match f(self.primary.as_ref()) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Catalog query '{}' failed: {}", what, e);
                let Some(fallback) = &self.fallback else {
                    return Vec::new();
                };
                log::info!("Falling back to filesystem scan for '{}'", what);
                f(fallback.as_ref()).unwrap_or_else(|e| {
                    log::warn!("Fallback query '{}' failed: {}", what, e);
                    Vec::new()
                })
            }
        }
    }

    pub fn list_images(&self) -> Vec<MediaEntry> {
        self.list_images_ordered(SortOrder::NewestFirst)
    }

    pub fn list_videos(&self) -> Vec<MediaEntry> {
        self.list_videos_ordered(SortOrder::NewestFirst)
    }

    pub fn list_images_ordered(&self, order: SortOrder) -> Vec<MediaEntry> {
        self.query("images", |c| c.list_images(order))
    }

    pub fn list_videos_ordered(&self, order: SortOrder) -> Vec<MediaEntry> {
        self.query("videos", |c| c.list_videos(order))
    }

    pub fn list_entries_for_buckets(&self, bucket_ids: &HashSet<String>) -> Vec<MediaEntry> {
        if bucket_ids.is_empty() {
            return Vec::new();
        }
        self.query("buckets", |c| c.list_entries_for_buckets(bucket_ids))
    }
}
