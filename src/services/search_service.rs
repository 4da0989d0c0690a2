use media_index::{MediaLibraryService, Photo, SearchScope, VisibilityPreference};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Receives the results of a debounced search
pub trait SearchListener: Send + Sync {
    fn on_results(&self, query: &str, results: Vec<Photo>);
}

/// Coalesces per-keystroke searches: each submission cancels the one in
/// flight and waits `delay` before querying.
pub struct SearchDebouncer {
    library: Arc<MediaLibraryService>,
    listener: Arc<dyn SearchListener>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchDebouncer {
    pub fn new(
        library: Arc<MediaLibraryService>,
        listener: Arc<dyn SearchListener>,
        delay: Duration,
    ) -> Self {
        Self {
            library,
            listener,
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn submit(&self, query: String, scope: SearchScope, pref: VisibilityPreference) {
        let library = Arc::clone(&self.library);
        let listener = Arc::clone(&self.listener);
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match library.search(query.clone(), scope, pref).await {
                Ok(results) => listener.on_results(&query, results),
                Err(e) => {
                    log::warn!("Search '{}' failed: {}", query, e);
                    listener.on_results(&query, Vec::new());
                }
            }
        });

        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.replace(handle) {
                previous.abort();
            }
        }
    }

    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.take() {
                previous.abort();
            }
        }
    }

    /// Waits for the latest submission to deliver its results
    pub async fn flush(&self) {
        let handle = self.pending.lock().ok().and_then(|mut p| p.take());
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    log::error!("Search task failed: {}", e);
                }
            }
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_index::{MediaIndexConfig, SqliteCatalog};
    use rusqlite::Connection;
    use std::fs;

    #[derive(Default)]
    struct Collector {
        seen: Mutex<Vec<(String, usize)>>,
    }

    impl SearchListener for Collector {
        fn on_results(&self, query: &str, results: Vec<Photo>) {
            self.seen
                .lock()
                .unwrap()
                .push((query.to_string(), results.len()));
        }
    }

    fn setup_library() -> Arc<MediaLibraryService> {
        let catalog = SqliteCatalog::new(Connection::open_in_memory().unwrap()).unwrap();
        Arc::new(MediaLibraryService::new(
            MediaIndexConfig::default(),
            Box::new(catalog),
        ))
    }

    #[tokio::test]
    async fn test_only_last_query_is_delivered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("beach.jpg"), b"x").unwrap();
        fs::write(dir.path().join("beach2.jpg"), b"x").unwrap();

        let collector = Arc::new(Collector::default());
        let debouncer = SearchDebouncer::new(
            setup_library(),
            collector.clone(),
            Duration::from_millis(50),
        );

        let scope = SearchScope::Album(dir.path().to_path_buf());
        for query in ["b", "be", "bea", "beach"] {
            debouncer.submit(query.to_string(), scope.clone(), VisibilityPreference::default());
        }
        debouncer.flush().await;

        let seen = collector.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![("beach".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_cancel_drops_pending_search() {
        let collector = Arc::new(Collector::default());
        let debouncer = SearchDebouncer::new(
            setup_library(),
            collector.clone(),
            Duration::from_millis(50),
        );
        debouncer.submit(
            "x".to_string(),
            SearchScope::Global,
            VisibilityPreference::default(),
        );
        debouncer.cancel();
        debouncer.flush().await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(collector.seen.lock().unwrap().is_empty());
    }
}
