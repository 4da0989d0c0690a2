//! Filename search over the media listing.
//!
//! Matching looks only at the file name without extension. An all-digit query
//! is a number lookup and matches exactly; any other query is a
//! case-insensitive text match on equality, prefix, or (from three characters
//! on) substring.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::MediaListCache;
use crate::indexer::{get_images_from_album, AlbumIndexer};
use crate::models::{folder_of, Photo, SelectionKind, VisibilityPreference};

const MIN_CONTAINS_LEN: usize = 3;

/// Where a search looks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    Global,
    Album(PathBuf),
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Digit string without leading zeros, so equal values compare equal at any length
fn canonical_digits(s: &str) -> &str {
    let trimmed = s.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}

/// Whether a file stem matches an already trimmed, non-empty query.
pub fn matches(query: &str, stem: &str) -> bool {
    if is_all_digits(query) {
        return stem == query
            || (is_all_digits(stem) && canonical_digits(stem) == canonical_digits(query));
    }

    let query = query.to_lowercase();
    let stem = stem.to_lowercase();
    stem == query
        || stem.starts_with(&query)
        || (query.chars().count() >= MIN_CONTAINS_LEN && stem.contains(&query))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    Exact,
    Prefix,
    Contains,
}

fn tier(query_lower: &str, stem_lower: &str) -> Tier {
    if stem_lower == query_lower {
        Tier::Exact
    } else if stem_lower.starts_with(query_lower) {
        Tier::Prefix
    } else {
        Tier::Contains
    }
}

/// Relevance order between two matching stems.
pub fn rank(query: &str, a: &str, b: &str) -> Ordering {
    let num_a = a.parse::<i64>().ok();
    let num_b = b.parse::<i64>().ok();

    match (num_a, num_b) {
        (Some(x), Some(y)) => match query.parse::<i64>() {
            Ok(q) => (x != q)
                .cmp(&(y != q))
                .then_with(|| (x as i128 - q as i128).abs().cmp(&(y as i128 - q as i128).abs()))
                .then_with(|| x.cmp(&y)),
            Err(_) => x.cmp(&y),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => {
            let q = query.to_lowercase();
            let la = a.to_lowercase();
            let lb = b.to_lowercase();
            tier(&q, &la)
                .cmp(&tier(&q, &lb))
                .then_with(|| la.cmp(&lb))
        }
    }
}

fn stem_of(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Filters and orders `candidates` for `query`; positions are re-assigned
/// to the result order.
pub fn filter_and_rank(query: &str, candidates: &[Photo]) -> Vec<Photo> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<(String, &Photo)> = candidates
        .iter()
        .map(|p| (stem_of(&p.path), p))
        .filter(|(stem, _)| matches(query, stem))
        .collect();

    hits.sort_by(|(sa, pa), (sb, pb)| rank(query, sa, sb).then_with(|| pa.path.cmp(&pb.path)));
    hits.into_iter()
        .enumerate()
        .map(|(idx, (_, p))| Photo::at(p.path.clone(), idx))
        .collect()
}

/// Stateless per call; the global pool comes from the shared listing cache.
pub struct SearchEngine {
    indexer: Arc<AlbumIndexer>,
    cache: Arc<MediaListCache>,
}

impl SearchEngine {
    pub fn new(indexer: Arc<AlbumIndexer>, cache: Arc<MediaListCache>) -> Self {
        Self { indexer, cache }
    }

    fn candidates(&self, scope: &SearchScope, pref: &VisibilityPreference) -> Vec<Photo> {
        match scope {
            SearchScope::Album(album) => get_images_from_album(album)
                .into_iter()
                .filter(|p| Path::new(&p.path).parent() == Some(album.as_path()))
                .collect(),
            SearchScope::Global => {
                let listing = self.cache.get_or_load(|| self.indexer.load_all_media());
                let filter = self.indexer.filter();
                listing
                    .photos
                    .iter()
                    .filter(|p| {
                        let Some(folder) = folder_of(&p.path) else {
                            return false;
                        };
                        match pref.kind {
                            SelectionKind::FolderPath => filter.is_visible(&folder, pref),
                            SelectionKind::BucketId => listing
                                .bucket_of(&folder)
                                .is_some_and(|bucket| filter.is_visible(bucket, pref)),
                        }
                    })
                    .cloned()
                    .collect()
            }
        }
    }

    pub fn search(
        &self,
        query: &str,
        scope: &SearchScope,
        pref: &VisibilityPreference,
    ) -> Vec<Photo> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let candidates = self.candidates(scope, pref);
        let results = filter_and_rank(query, &candidates);
        log::debug!(
            "Search '{}' matched {} of {} candidates",
            query.trim(),
            results.len(),
            candidates.len()
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{entry, FailingCatalog, MemoryCatalog};
    use crate::catalog::CatalogAdapter;
    use crate::visibility::VisibilityFilter;
    use std::fs;

    fn paths(photos: &[Photo]) -> Vec<String> {
        photos
            .iter()
            .map(|p| Path::new(&p.path).file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_numeric_query_is_exact() {
        let candidates = vec![
            Photo::new("/a/5.jpg"),
            Photo::new("/a/50.jpg"),
            Photo::new("/a/15.jpg"),
        ];
        assert_eq!(paths(&filter_and_rank("5", &candidates)), vec!["5.jpg"]);
    }

    #[test]
    fn test_numeric_equality_beyond_i64() {
        let big = "123456789012345678901234567890";
        assert!(matches(big, &format!("000{big}")));
        assert!(matches("007", "7"));
        assert!(!matches("7", "img7"));
    }

    #[test]
    fn test_contains_needs_three_chars() {
        assert!(!matches("ab", "cabbage"));
        assert!(matches("abb", "cabbage"));
        assert!(matches("ca", "Cabbage"));
        assert!(matches("CABBAGE", "cabbage"));
    }

    #[test]
    fn test_text_ranking_tiers() {
        let candidates = vec![
            Photo::new("/a/sunset_beach.jpg"),
            Photo::new("/b/Beach.png"),
            Photo::new("/c/beach2.jpg"),
            Photo::new("/d/abeach.jpg"),
            Photo::new("/e/unrelated.jpg"),
        ];
        let results = filter_and_rank("beach", &candidates);
        assert_eq!(
            paths(&results),
            vec!["Beach.png", "beach2.jpg", "abeach.jpg", "sunset_beach.jpg"]
        );
        assert_eq!(results[2].position, 2);
    }

    #[test]
    fn test_numeric_stems_rank_by_distance() {
        assert_eq!(rank("10", "10", "9"), Ordering::Less);
        assert_eq!(rank("10", "12", "9"), Ordering::Greater);
        assert_eq!(rank("10", "9", "11"), Ordering::Less);
        assert_eq!(rank("x", "3", "abc"), Ordering::Less);
        assert_eq!(rank("x", "abc", "3"), Ordering::Greater);
    }

    #[test]
    fn test_empty_query() {
        let candidates = vec![Photo::new("/a/1.jpg")];
        assert!(filter_and_rank("   ", &candidates).is_empty());

        let catalog = CatalogAdapter::new(Box::new(FailingCatalog));
        let indexer = Arc::new(AlbumIndexer::new(Arc::new(catalog), VisibilityFilter::default()));
        let engine = SearchEngine::new(indexer, Arc::new(MediaListCache::default()));
        assert!(engine
            .search("", &SearchScope::Global, &VisibilityPreference::default())
            .is_empty());
        assert!(engine
            .search("img", &SearchScope::Global, &VisibilityPreference::default())
            .is_empty());
    }

    #[test]
    fn test_global_search_respects_visibility() {
        let catalog = CatalogAdapter::new(Box::new(MemoryCatalog {
            entries: vec![
                entry(1, "/sd/DCIM/Camera/holiday1.jpg", "A", 3),
                entry(2, "/sd/Download/holiday2.jpg", "B", 2),
                entry(3, "/sd/DCIM/other.jpg", "C", 1),
            ],
        }));
        let indexer = Arc::new(AlbumIndexer::new(Arc::new(catalog), VisibilityFilter::default()));
        let engine = SearchEngine::new(indexer, Arc::new(MediaListCache::default()));

        let all = engine.search("holiday", &SearchScope::Global, &VisibilityPreference::default());
        assert_eq!(paths(&all), vec!["holiday1.jpg", "holiday2.jpg"]);

        let pref = VisibilityPreference::only(SelectionKind::FolderPath, ["/sd/DCIM"]);
        let dcim = engine.search("holiday", &SearchScope::Global, &pref);
        assert_eq!(paths(&dcim), vec!["holiday1.jpg"]);
    }

    #[test]
    fn test_global_search_uses_catalog_bucket_ids() {
        let catalog = CatalogAdapter::new(Box::new(MemoryCatalog {
            entries: vec![
                entry(1, "/sd/DCIM/Camera/a1.jpg", "cam", 3),
                entry(2, "/sd/Download/a2.jpg", "dl", 2),
            ],
        }));
        let indexer = Arc::new(AlbumIndexer::new(Arc::new(catalog), VisibilityFilter::default()));
        let engine = SearchEngine::new(Arc::clone(&indexer), Arc::new(MediaListCache::default()));

        let pref = VisibilityPreference::only(SelectionKind::BucketId, ["cam"]);
        let albums = indexer
            .build_album_folders(&pref, &crate::cancel::CancelToken::new())
            .unwrap();
        assert_eq!(albums.len(), 1);

        let hits = engine.search("a", &SearchScope::Global, &pref);
        assert_eq!(paths(&hits), vec!["a1.jpg"]);
    }

    #[test]
    fn test_album_scope() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("5.jpg"), b"x").unwrap();
        fs::write(dir.path().join("50.jpg"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/5.jpg"), b"x").unwrap();

        let catalog = CatalogAdapter::new(Box::new(FailingCatalog));
        let indexer = Arc::new(AlbumIndexer::new(Arc::new(catalog), VisibilityFilter::default()));
        let engine = SearchEngine::new(indexer, Arc::new(MediaListCache::default()));

        let results = engine.search(
            "5",
            &SearchScope::Album(dir.path().to_path_buf()),
            &VisibilityPreference::default(),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].path,
            dir.path().join("5.jpg").to_string_lossy()
        );
    }
}
