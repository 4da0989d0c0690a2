use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Clock, MediaListCache, SystemClock, DEFAULT_CACHE_TTL};
use crate::cancel::CancelToken;
use crate::catalog::{CatalogAdapter, FilesystemCatalog, MediaCatalog};
use crate::error::{IndexError, IndexResult};
use crate::indexer::{self, AlbumIndexer};
use crate::models::{AlbumFolder, MediaListing, Photo, VisibilityPreference};
use crate::pager::{AlbumPager, Page, DEFAULT_PAGE_SIZE};
use crate::search::{SearchEngine, SearchScope};
use crate::visibility::{PrefixMatch, VisibilityFilter};

/// Tunables of the media library
#[derive(Debug, Clone)]
pub struct MediaIndexConfig {
    pub page_size: usize,
    pub cache_ttl: Duration,
    pub prefix_match: PrefixMatch,
    /// Walked when the primary catalog fails; empty disables the fallback
    pub fallback_roots: Vec<PathBuf>,
}

impl Default for MediaIndexConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cache_ttl: DEFAULT_CACHE_TTL,
            prefix_match: PrefixMatch::Literal,
            fallback_roots: Vec::new(),
        }
    }
}

/// Runs a blocking closure on the blocking pool
async fn blocking<T, F>(f: F) -> IndexResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| IndexError::TaskFailed(e.to_string()))
}

/// Async facade over indexing, paging and search.
///
/// All filesystem and catalog work runs through `spawn_blocking`, so these
/// methods are safe to await from a latency-sensitive task.
pub struct MediaLibraryService {
    config: MediaIndexConfig,
    indexer: Arc<AlbumIndexer>,
    cache: Arc<MediaListCache>,
    search: Arc<SearchEngine>,
}

impl MediaLibraryService {
    pub fn new(config: MediaIndexConfig, primary: Box<dyn MediaCatalog>) -> Self {
        Self::with_clock(config, primary, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: MediaIndexConfig,
        primary: Box<dyn MediaCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut adapter = CatalogAdapter::new(primary);
        if !config.fallback_roots.is_empty() {
            adapter = adapter.with_fallback(Box::new(FilesystemCatalog::new(
                config.fallback_roots.clone(),
            )));
        }

        let indexer = Arc::new(AlbumIndexer::new(
            Arc::new(adapter),
            VisibilityFilter::new(config.prefix_match),
        ));
        let cache = Arc::new(MediaListCache::with_clock(config.cache_ttl, clock));
        let search = Arc::new(SearchEngine::new(Arc::clone(&indexer), Arc::clone(&cache)));

        Self {
            config,
            indexer,
            cache,
            search,
        }
    }

    pub fn config(&self) -> &MediaIndexConfig {
        &self.config
    }

    pub fn indexer(&self) -> &Arc<AlbumIndexer> {
        &self.indexer
    }

    pub fn filter(&self) -> VisibilityFilter {
        self.indexer.filter()
    }

    pub fn cache(&self) -> &Arc<MediaListCache> {
        &self.cache
    }

    pub fn invalidate_cache(&self) {
        self.cache.invalidate();
    }

    pub async fn build_covers(
        &self,
        pref: VisibilityPreference,
        cancel: CancelToken,
    ) -> IndexResult<BTreeMap<String, Vec<Photo>>> {
        let indexer = Arc::clone(&self.indexer);
        blocking(move || indexer.build_covers(&pref, &cancel)).await?
    }

    pub async fn build_album_folders(
        &self,
        pref: VisibilityPreference,
        cancel: CancelToken,
    ) -> IndexResult<Vec<AlbumFolder>> {
        let indexer = Arc::clone(&self.indexer);
        blocking(move || indexer.build_album_folders(&pref, &cancel)).await?
    }

    pub async fn images_from_album(&self, album: PathBuf) -> IndexResult<Vec<Photo>> {
        blocking(move || indexer::get_images_from_album(&album)).await
    }

    pub async fn collect_subfolders(
        &self,
        root: PathBuf,
        cancel: CancelToken,
    ) -> IndexResult<BTreeSet<String>> {
        blocking(move || indexer::collect_subfolders(&root, &cancel)).await?
    }

    /// The global listing, served from the cache while fresh
    pub async fn all_media(&self) -> IndexResult<Arc<MediaListing>> {
        let indexer = Arc::clone(&self.indexer);
        let cache = Arc::clone(&self.cache);
        blocking(move || cache.get_or_load(|| indexer.load_all_media())).await
    }

    /// Folder chooser entries: every folder of the global listing
    pub async fn list_all_folders(&self) -> IndexResult<Vec<String>> {
        let media = self.all_media().await?;
        Ok(indexer::list_all_folders(&media.photos))
    }

    pub async fn load_page(&self, album: PathBuf, page: usize) -> IndexResult<Page> {
        let pager = AlbumPager::with_page_size(album, self.config.page_size);
        blocking(move || pager.load(page)).await
    }

    pub async fn search(
        &self,
        query: String,
        scope: SearchScope,
        pref: VisibilityPreference,
    ) -> IndexResult<Vec<Photo>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let search = Arc::clone(&self.search);
        blocking(move || search.search(&query, &scope, &pref)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::ManualClock;
    use crate::catalog::testing::{entry, FailingCatalog, MemoryCatalog};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how often the full listing is queried
    struct CountingCatalog {
        inner: MemoryCatalog,
        calls: Arc<AtomicUsize>,
    }

    impl MediaCatalog for CountingCatalog {
        fn list_images(&self, order: crate::SortOrder) -> IndexResult<Vec<crate::MediaEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.list_images(order)
        }

        fn list_videos(&self, order: crate::SortOrder) -> IndexResult<Vec<crate::MediaEntry>> {
            self.inner.list_videos(order)
        }

        fn list_entries_for_buckets(
            &self,
            ids: &std::collections::HashSet<String>,
        ) -> IndexResult<Vec<crate::MediaEntry>> {
            self.inner.list_entries_for_buckets(ids)
        }
    }

    #[tokio::test]
    async fn test_all_media_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let catalog = CountingCatalog {
            inner: MemoryCatalog {
                entries: vec![
                    entry(1, "/sd/A/1.jpg", "A", 1),
                    entry(2, "/sd/B/2.jpg", "B", 2),
                ],
            },
            calls: Arc::clone(&calls),
        };
        let clock = Arc::new(ManualClock::default());
        let service = MediaLibraryService::with_clock(
            MediaIndexConfig::default(),
            Box::new(catalog),
            clock.clone(),
        );

        assert_eq!(service.all_media().await.unwrap().len(), 2);
        assert_eq!(service.list_all_folders().await.unwrap(), vec!["/sd/A", "/sd/B"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(31_000);
        service.all_media().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        service.invalidate_cache();
        service.all_media().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_filesystem_fallback() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Camera")).unwrap();
        fs::write(dir.path().join("Camera/a.jpg"), b"x").unwrap();

        let config = MediaIndexConfig {
            fallback_roots: vec![dir.path().to_path_buf()],
            ..Default::default()
        };
        let service = MediaLibraryService::new(config, Box::new(FailingCatalog));
        let albums = service
            .build_album_folders(VisibilityPreference::default(), CancelToken::new())
            .await
            .unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].name, "Camera");

        let without = MediaLibraryService::new(MediaIndexConfig::default(), Box::new(FailingCatalog));
        assert!(without
            .build_album_folders(VisibilityPreference::default(), CancelToken::new())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_paging_and_search() {
        let dir = tempfile::tempdir().unwrap();
        for i in 1..=5 {
            fs::write(dir.path().join(format!("{i}.jpg")), b"x").unwrap();
        }

        let config = MediaIndexConfig {
            page_size: 2,
            ..Default::default()
        };
        let service = MediaLibraryService::new(config, Box::new(FailingCatalog));

        let page = service.load_page(dir.path().to_path_buf(), 2).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].position, 4);
        assert!(!page.has_next);

        let hits = service
            .search(
                "3".to_string(),
                SearchScope::Album(dir.path().to_path_buf()),
                VisibilityPreference::default(),
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        assert!(service
            .search(" ".to_string(), SearchScope::Global, VisibilityPreference::default())
            .await
            .unwrap()
            .is_empty());

        let images = service
            .images_from_album(dir.path().to_path_buf())
            .await
            .unwrap();
        assert_eq!(images.len(), 5);
    }
}
