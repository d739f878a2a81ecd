//! Named document caches.
//!
//! A [`CacheFactory`] owns one [`Cache`] per name. Which cache implementation
//! backs a name is decided once, from the [`RuntimeEnv`] in the factory's
//! [`CacheConfig`].

mod cache_factory;
mod lru_memory_cache;

pub use cache_factory::*;
pub use lru_memory_cache::*;

use crate::collection::Document;

/// A keyed store of documents that may forget entries at any time.
///
/// Implementations must be safe to share between threads.
pub trait Cache: Send + Sync {
    /// Returns a copy of the cached document, counting a hit or a miss.
    fn get(&self, key: &str) -> Option<Document>;

    fn put(&self, key: &str, document: Document);

    /// Removes one entry, returning it if it was present.
    fn remove(&self, key: &str) -> Option<Document>;

    fn remove_all(&self);

    /// Checks for an entry without touching its recency or the hit counters.
    fn contains(&self, key: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn hit_count(&self) -> u64;

    fn miss_count(&self) -> u64;
}
