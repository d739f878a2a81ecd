use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::Cache;
use crate::collection::Document;
use crate::common::DEFAULT_CACHE_CAPACITY;
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};

/// In-process cache that evicts the least recently used entry once full.
pub struct LruMemoryCache {
    inner: Mutex<LruCache<String, Document>>,
    capacity: usize,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl LruMemoryCache {
    /// Creates a cache holding at most `capacity` documents.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `capacity` is zero.
    pub fn new(capacity: usize) -> RepositoryResult<Self> {
        let Some(cap) = NonZeroUsize::new(capacity) else {
            log::error!("Cache capacity must be at least 1");
            return Err(RepositoryError::new(
                "Cache capacity must be at least 1",
                ErrorKind::InvalidConfiguration,
            ));
        };

        Ok(LruMemoryCache {
            inner: Mutex::new(LruCache::new(cap)),
            capacity,
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LruMemoryCache {
    fn default() -> Self {
        LruMemoryCache {
            inner: Mutex::new(LruCache::new(
                NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            )),
            capacity: DEFAULT_CACHE_CAPACITY,
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        }
    }
}

impl Cache for LruMemoryCache {
    fn get(&self, key: &str) -> Option<Document> {
        let mut cache = self.inner.lock();
        match cache.get(key) {
            Some(document) => {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                Some(document.clone())
            }
            None => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn put(&self, key: &str, document: Document) {
        self.inner.lock().put(key.to_string(), document);
    }

    fn remove(&self, key: &str) -> Option<Document> {
        self.inner.lock().pop(key)
    }

    fn remove_all(&self) {
        self.inner.lock().clear();
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains(key)
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }

    fn hit_count(&self) -> u64 {
        self.hit_count.load(Ordering::Relaxed)
    }

    fn miss_count(&self) -> u64 {
        self.miss_count.load(Ordering::Relaxed)
    }
}
