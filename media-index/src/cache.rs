//! Time-boxed memoization of the full media listing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::models::MediaListing;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(30_000);

/// Source of "now" in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

struct CacheEntry {
    data: Arc<MediaListing>,
    captured_at: i64,
}

/// Single-slot cache of the sorted media listing.
///
/// One instance per session, shared by reference. The slot lock is held while
/// the loader runs, so concurrent misses wait for one load instead of scanning
/// twice.
pub struct MediaListCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<CacheEntry>>,
}

impl MediaListCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached listing, or runs `loader` and caches its result.
    ///
    /// Freshness is counted from when the load finished.
    pub fn get_or_load<F>(&self, loader: F) -> Arc<MediaListing>
    where
        F: FnOnce() -> MediaListing,
    {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| {
            log::warn!("Media cache lock poisoned, resetting");
            let mut guard = poisoned.into_inner();
            *guard = None;
            guard
        });

        let now = self.clock.now_millis();
        if let Some(entry) = slot.as_ref() {
            if now - entry.captured_at < self.ttl.as_millis() as i64 {
                return Arc::clone(&entry.data);
            }
        }

        log::debug!("Media cache miss, loading listing");
        let data = Arc::new(loader());
        *slot = Some(CacheEntry {
            data: Arc::clone(&data),
            captured_at: self.clock.now_millis(),
        });
        data
    }

    /// Drops the cached listing; the next access reloads.
    pub fn invalidate(&self) {
        match self.slot.lock() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
        log::debug!("Media cache invalidated");
    }

    pub fn is_fresh(&self) -> bool {
        let now = self.clock.now_millis();
        self.slot
            .lock()
            .map(|slot| {
                slot.as_ref()
                    .is_some_and(|e| now - e.captured_at < self.ttl.as_millis() as i64)
            })
            .unwrap_or(false)
    }
}

impl Default for MediaListCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
