use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::indexer::get_images_from_album;
use crate::models::Photo;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const LEGACY_PAGE_SIZE: usize = 100;

/// One window of an album listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: usize,
    pub items: Vec<Photo>,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Page {
    pub fn prev_key(&self) -> Option<usize> {
        self.has_prev.then(|| self.page - 1)
    }

    pub fn next_key(&self) -> Option<usize> {
        self.has_next.then(|| self.page + 1)
    }
}

/// Pages through a single album in natural order.
///
/// Every [`AlbumPager::load`] re-lists the folder; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct AlbumPager {
    album: PathBuf,
    page_size: usize,
}

impl AlbumPager {
    pub fn new(album: impl Into<PathBuf>) -> Self {
        Self::with_page_size(album, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(album: impl Into<PathBuf>, page_size: usize) -> Self {
        Self {
            album: album.into(),
            page_size: page_size.max(1),
        }
    }

    pub fn album(&self) -> &Path {
        &self.album
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Loads page `page` (0-based). Positions are absolute within the album.
    pub fn load(&self, page: usize) -> Page {
        let files = get_images_from_album(&self.album);
        let offset = page.saturating_mul(self.page_size);

        let items: Vec<Photo> = files
            .into_iter()
            .skip(offset)
            .take(self.page_size)
            .enumerate()
            .map(|(idx, photo)| Photo {
                position: offset + idx,
                ..photo
            })
            .collect();

        Page {
            page,
            has_prev: page > 0,
            has_next: items.len() == self.page_size,
            items,
        }
    }

    /// Page that contains `position`, used when reloading around the item last shown.
    pub fn refresh_key(&self, position: Option<usize>) -> usize {
        position.map_or(0, |p| p / self.page_size)
    }
}

/// 1-based page of [`LEGACY_PAGE_SIZE`] items over an in-memory list.
///
/// Page 0 and pages past the end are empty.
pub fn legacy_page(data: &[Photo], page: usize) -> Vec<Photo> {
    if page == 0 {
        return Vec::new();
    }
    let start = (page - 1).saturating_mul(LEGACY_PAGE_SIZE);
    data.iter().skip(start).take(LEGACY_PAGE_SIZE).cloned().collect()
}
