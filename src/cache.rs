//! Short-lived screenshot result cache.
//!
//! Maps a (normalized URL, device class) key to the stored screenshot's
//! display path and filename. Entries expire after a fixed TTL and the cache
//! is bounded; when full, the oldest-inserted entry is evicted. The cache
//! holds metadata only; the files themselves belong to the retention sweeper,
//! so callers must re-check the file on disk before trusting a hit.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A cached capture result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Path relative to the static assets root, e.g. `screenshots/foo.webp`.
    pub display_path: String,
    /// Bare filename within the screenshot directory.
    pub filename: String,
}

#[derive(Debug)]
struct Stored {
    entry: CacheEntry,
    inserted_at: Instant,
}

/// TTL and capacity bounded cache keyed by (url, device class).
///
/// Constructed once at startup and shared by reference across requests.
/// Lookups do not refresh the TTL.
pub struct ScreenshotCache {
    entries: Mutex<HashMap<String, Stored>>,
    ttl: Duration,
    max_entries: usize,
}

impl ScreenshotCache {
    /// Create a cache with the given TTL and maximum entry count.
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Build the deterministic cache key for a (url, device class) pair.
    #[must_use]
    pub fn key(normalized_url: &str, device_class: &str) -> String {
        format!("{normalized_url}_{device_class}")
    }

    /// Look up an entry. Expired entries behave as misses.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|stored| stored.inserted_at.elapsed() < self.ttl)
            .map(|stored| stored.entry.clone())
    }

    /// Insert an entry, evicting expired entries and, if still at capacity,
    /// the oldest-inserted live entry.
    pub fn insert(&self, key: String, entry: CacheEntry) {
        let mut entries = self.entries.lock().unwrap();

        let ttl = self.ttl;
        entries.retain(|_, stored| stored.inserted_at.elapsed() < ttl);

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, stored)| stored.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest_key) = oldest {
                entries.remove(&oldest_key);
            }
        }

        entries.insert(
            key,
            Stored {
                entry,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of live (non-expired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap();
        entries
            .values()
            .filter(|stored| stored.inserted_at.elapsed() < self.ttl)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rewind an entry's insertion time, for eviction-ordering tests.
    #[cfg(test)]
    fn backdate(&self, key: &str, age: Duration) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(stored) = entries.get_mut(key) {
            stored.inserted_at = Instant::now()
                .checked_sub(age)
                .expect("backdate past monotonic clock origin");
        }
    }
}
