//! # Media Index
//!
//! Album discovery and ordering for an on-device media gallery.
//!
//! This crate provides the indexing engine behind the gallery app:
//! - Natural ("human") ordering of file and folder names
//! - Album discovery from a media catalog, in lazy cover mode or full bucket mode
//! - Folder / bucket visibility filtering from user preferences
//! - A time-boxed cache of the full media listing
//! - Fixed-size paging through a single album
//! - Filename search with numeric and text matching
//!
//! ## Platform Separation
//!
//! The platform media index is reached through the [`MediaCatalog`] trait and
//! preferences through [`PreferenceStore`]. Storage backends and UI live in the
//! application crate.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use media_index::{MediaIndexConfig, MediaLibraryService, SqliteCatalog};
//!
//! let catalog = SqliteCatalog::open(Path::new("/data/gallery.db"))?;
//! let service = MediaLibraryService::new(MediaIndexConfig::default(), Box::new(catalog));
//!
//! let albums = service
//!     .build_album_folders(VisibilityPreference::default(), CancelToken::new())
//!     .await?;
//! ```

pub mod cache;
pub mod cancel;
pub mod catalog;
pub mod error;
pub mod fs;
pub mod indexer;
pub mod models;
pub mod natural;
pub mod pager;
pub mod prefs;
pub mod schema;
pub mod search;
pub mod service;
pub mod visibility;

pub use cache::{Clock, MediaListCache, SystemClock, DEFAULT_CACHE_TTL};
pub use cancel::CancelToken;
pub use catalog::{bucket_id_for, CatalogAdapter, FilesystemCatalog, MediaCatalog, SqliteCatalog};
pub use error::{IndexError, IndexResult};
pub use indexer::{
    collect_subfolders, count_media, get_images_from_album, group_by_folder, list_all_folders,
    AlbumIndexer,
};
pub use models::{
    clear_selection, diff_photos, folder_of, select_all, selected_paths, toggle_selection,
    AlbumFolder, MediaEntry, MediaListing, Photo, PhotoDiff, SelectionKind, SortOrder,
    VisibilityPreference,
};
pub use natural::{compare_files, compare_folders, natural_cmp};
pub use pager::{legacy_page, AlbumPager, Page, DEFAULT_PAGE_SIZE, LEGACY_PAGE_SIZE};
pub use prefs::{
    migrate_folder_selection, AlbumSelection, FolderSelection, LastImage, MemoryPreferenceStore,
    PreferenceStore,
};
pub use schema::init_catalog_schema;
pub use search::{SearchEngine, SearchScope};
pub use service::{MediaIndexConfig, MediaLibraryService};
pub use visibility::{PrefixMatch, VisibilityFilter};
