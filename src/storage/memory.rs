use std::fmt;
use std::time::Duration;

use moka::sync::Cache;
use tracing::debug;

use super::{CacheEntry, Flush, Origin, Storage, StorageError};

pub const DEFAULT_CAPACITY: usize = 100;
pub const MEMORY_ORIGIN: &str = "IN-MEMORY";

/// An in-process store backed by a [`moka`] cache.
///
/// Holds at most `capacity` entries; moka decides which keys to evict once
/// that bound is reached. With a TTL, entries older than it read as
/// [`StorageError::NotFound`].
///
/// ```
/// use std::time::Duration;
/// use httpcache::storage::MemoryStorage;
///
/// let storage = MemoryStorage::new().capacity(500).ttl(Duration::from_secs(60));
/// assert!(storage.is_empty());
/// ```
pub struct MemoryStorage {
    capacity: usize,
    ttl: Option<Duration>,
    cache: Cache<String, CacheEntry>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::build(DEFAULT_CAPACITY, None)
    }

    fn build(capacity: usize, ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder().max_capacity(capacity as u64);
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }

        debug!(capacity, ttl = ?ttl, "memory storage created");

        Self {
            capacity,
            ttl,
            cache: builder.build(),
        }
    }

    /// Maximum number of entries; `0` is treated as `1`.
    ///
    /// Rebuilds the underlying cache, so call it before storing anything.
    #[must_use]
    pub fn capacity(self, capacity: usize) -> Self {
        Self::build(capacity.max(1), self.ttl)
    }

    /// Rebuilds the underlying cache with a time-to-live.
    #[must_use]
    pub fn ttl(self, ttl: Duration) -> Self {
        Self::build(self.capacity, Some(ttl))
    }

    pub fn len(&self) -> usize {
        self.cache.run_pending_tasks();
        usize::try_from(self.cache.entry_count()).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<CacheEntry, StorageError> {
        self.cache.get(key).ok_or(StorageError::NotFound)
    }

    fn set(&self, key: &str, entry: CacheEntry) -> Result<(), StorageError> {
        self.cache.insert(key.to_owned(), entry);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.cache.invalidate(key);
        Ok(())
    }

    fn as_flush(&self) -> Option<&dyn Flush> {
        Some(self)
    }

    fn as_origin(&self) -> Option<&dyn Origin> {
        Some(self)
    }
}

impl Flush for MemoryStorage {
    fn flush(&self) -> Result<(), StorageError> {
        self.cache.invalidate_all();
        Ok(())
    }
}

impl Origin for MemoryStorage {
    fn origin(&self) -> &str {
        MEMORY_ORIGIN
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use chrono::DateTime;

    use super::*;

    fn entry(uri: &str) -> CacheEntry {
        CacheEntry::new(
            "GET",
            uri,
            Bytes::from_static(b"HTTP/1.1 200 OK\r\n\r\n"),
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        )
    }

    #[test]
    fn set_get_delete() {
        let storage = MemoryStorage::new();
        assert!(matches!(storage.get("a"), Err(StorageError::NotFound)));

        storage.set("a", entry("/a")).unwrap();
        assert_eq!(storage.get("a").unwrap().request_uri, "/a");

        storage.set("a", entry("/b")).unwrap();
        assert_eq!(storage.get("a").unwrap().request_uri, "/b");
        assert_eq!(storage.len(), 1);

        storage.delete("a").unwrap();
        assert!(storage.get("a").is_err());
        storage.delete("a").unwrap();
    }

    #[test]
    fn capacity_bounds_entry_count() {
        let storage = MemoryStorage::new().capacity(2);
        for i in 0..20 {
            let key = format!("k{i}");
            storage.set(&key, entry(&key)).unwrap();
        }
        assert!(storage.len() <= 2);
    }

    #[test]
    fn zero_capacity_still_holds_one() {
        let storage = MemoryStorage::new().capacity(0);
        storage.set("a", entry("/a")).unwrap();
        assert!(storage.get("a").is_ok());
    }

    #[test]
    fn ttl_expires_entries() {
        let storage = MemoryStorage::new().ttl(Duration::from_millis(20));
        storage.set("a", entry("/a")).unwrap();
        assert!(storage.get("a").is_ok());

        std::thread::sleep(Duration::from_millis(60));
        assert!(matches!(storage.get("a"), Err(StorageError::NotFound)));
    }

    #[test]
    fn flush_and_origin_capabilities() {
        let storage = MemoryStorage::new();
        storage.set("a", entry("/a")).unwrap();
        storage.set("b", entry("/b")).unwrap();

        storage.as_flush().unwrap().flush().unwrap();
        assert!(storage.get("a").is_err());
        assert!(storage.get("b").is_err());
        assert_eq!(storage.as_origin().unwrap().origin(), "IN-MEMORY");
    }

    #[test]
    fn concurrent_access() {
        let storage = std::sync::Arc::new(MemoryStorage::new().capacity(1000));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let storage = storage.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let key = format!("{t}-{i}");
                        storage.set(&key, entry(&key)).unwrap();
                        assert!(storage.get(&key).is_ok());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        for t in 0..8 {
            for i in 0..50 {
                assert!(storage.get(&format!("{t}-{i}")).is_ok());
            }
        }
    }
}
