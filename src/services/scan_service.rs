use crate::error::AppError;
use media_index::{CancelToken, FilesystemCatalog, SqliteCatalog};
use std::path::PathBuf;
use std::sync::Arc;

/// Outcome of one scan pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub indexed: usize,
    pub removed: usize,
}

/// Walks `roots` and upserts every media file into the catalog table, then
/// drops rows whose files are gone.
///
/// Cancellation is checked while walking and between upserts; rows written
/// so far stay.
pub fn scan_into_catalog(
    catalog: &SqliteCatalog,
    roots: &[PathBuf],
    cancel: &CancelToken,
) -> Result<ScanReport, AppError> {
    log::info!("Scanning {} root(s) for media", roots.len());

    let mut report = ScanReport::default();
    for entry in FilesystemCatalog::new(roots.to_vec()).scan(cancel)? {
        cancel.check()?;
        match catalog.upsert(&entry) {
            Ok(_) => report.indexed += 1,
            Err(e) => log::warn!("Could not index {}: {}", entry.path, e),
        }
    }

    report.removed = catalog.remove_missing()?;
    log::info!(
        "Scan finished: {} indexed, {} removed",
        report.indexed,
        report.removed
    );
    Ok(report)
}

/// Runs [`scan_into_catalog`] on the blocking pool
pub async fn scan(
    catalog: Arc<SqliteCatalog>,
    roots: Vec<PathBuf>,
    cancel: CancelToken,
) -> Result<ScanReport, AppError> {
    tokio::task::spawn_blocking(move || scan_into_catalog(&catalog, &roots, &cancel))
        .await
        .map_err(|e| AppError::Other(format!("Task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_index::{MediaCatalog, SortOrder};
    use rusqlite::Connection;
    use std::fs;

    fn setup_test_catalog() -> SqliteCatalog {
        SqliteCatalog::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn test_scan_indexes_and_prunes() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Camera")).unwrap();
        fs::write(dir.path().join("Camera/a.jpg"), b"x").unwrap();
        fs::write(dir.path().join("Camera/b.mp4"), b"x").unwrap();
        fs::write(dir.path().join("Camera/c.txt"), b"x").unwrap();

        let catalog = setup_test_catalog();
        let roots = vec![dir.path().to_path_buf()];
        let report = scan_into_catalog(&catalog, &roots, &CancelToken::new()).unwrap();
        assert_eq!(report, ScanReport { indexed: 2, removed: 0 });
        assert_eq!(catalog.list_images(SortOrder::NewestFirst).unwrap().len(), 1);
        assert_eq!(catalog.list_videos(SortOrder::NewestFirst).unwrap().len(), 1);

        fs::remove_file(dir.path().join("Camera/b.mp4")).unwrap();
        let report = scan_into_catalog(&catalog, &roots, &CancelToken::new()).unwrap();
        assert_eq!(report, ScanReport { indexed: 1, removed: 1 });
        assert_eq!(catalog.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_scan() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let result = scan(
            Arc::new(setup_test_catalog()),
            vec![dir.path().to_path_buf()],
            cancel,
        )
        .await;
        assert!(matches!(
            result,
            Err(AppError::Index(media_index::IndexError::Cancelled))
        ));
    }
}
