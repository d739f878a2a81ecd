use dashmap::DashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use crate::cache::{Cache, LruMemoryCache};
use crate::common::DEFAULT_CACHE_CAPACITY;
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};

/// The environment the process runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RuntimeEnv {
    #[default]
    Local,
    Gae,
}

impl RuntimeEnv {
    /// Picks the cache implementation for this environment.
    pub fn cache_backend(&self) -> CacheBackend {
        match self {
            RuntimeEnv::Local | RuntimeEnv::Gae => CacheBackend::LocalLru,
        }
    }
}

impl Display for RuntimeEnv {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeEnv::Local => write!(f, "LOCAL"),
            RuntimeEnv::Gae => write!(f, "GAE"),
        }
    }
}

impl FromStr for RuntimeEnv {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOCAL" => Ok(RuntimeEnv::Local),
            "GAE" => Ok(RuntimeEnv::Gae),
            _ => {
                log::error!("Unknown runtime environment[{}]", s);
                Err(RepositoryError::new(
                    &format!("Unknown runtime environment[{}]", s),
                    ErrorKind::InvalidConfiguration,
                ))
            }
        }
    }
}

/// Cache implementations a [CacheFactory] can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheBackend {
    LocalLru,
}

/// Settings of a [CacheFactory].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub runtime_env: RuntimeEnv,
    /// Maximum entries per named cache.
    pub capacity: usize,
}

impl CacheConfig {
    pub fn new(runtime_env: RuntimeEnv, capacity: usize) -> Self {
        CacheConfig {
            runtime_env,
            capacity,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig::new(RuntimeEnv::default(), DEFAULT_CACHE_CAPACITY)
    }
}

/// Registry of named caches.
///
/// The backend is resolved from the runtime environment once, when the factory
/// is built. Each name gets its cache on first request and the same instance on
/// every later one. The factory holds no global state; whoever builds it owns
/// the caches.
///
/// ```rust
/// use repono::cache::{CacheConfig, CacheFactory};
/// use repono::doc;
///
/// let factory = CacheFactory::new(CacheConfig::default()).unwrap();
/// factory.get_cache("articles").put("1", doc! { "title": "a" });
/// assert!(factory.get_cache("articles").contains("1"));
/// ```
#[derive(Clone)]
pub struct CacheFactory {
    inner: Arc<CacheFactoryInner>,
}

impl CacheFactory {
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the capacity is zero.
    pub fn new(config: CacheConfig) -> RepositoryResult<Self> {
        if config.capacity == 0 {
            log::error!("Cache capacity must be at least 1");
            return Err(RepositoryError::new(
                "Cache capacity must be at least 1",
                ErrorKind::InvalidConfiguration,
            ));
        }

        let backend = config.runtime_env.cache_backend();
        log::debug!(
            "Using {:?} caches for runtime environment {}",
            backend,
            config.runtime_env
        );
        Ok(CacheFactory {
            inner: Arc::new(CacheFactoryInner {
                backend,
                capacity: config.capacity,
                caches: DashMap::new(),
            }),
        })
    }

    pub fn backend(&self) -> CacheBackend {
        self.inner.backend
    }

    /// Returns the cache registered under `name`, creating it on first use.
    pub fn get_cache(&self, name: &str) -> Arc<dyn Cache> {
        self.inner
            .caches
            .entry(name.to_string())
            .or_insert_with(|| self.inner.create_cache(name))
            .clone()
    }

    /// Returns the names of every created cache, sorted.
    pub fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .caches
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Empties every cache. The caches stay registered.
    pub fn clear_all(&self) {
        for entry in self.inner.caches.iter() {
            entry.value().remove_all();
        }
    }
}

struct CacheFactoryInner {
    backend: CacheBackend,
    capacity: usize,
    caches: DashMap<String, Arc<dyn Cache>>,
}

impl CacheFactoryInner {
    fn create_cache(&self, name: &str) -> Arc<dyn Cache> {
        log::debug!("Creating cache {}", name);
        match self.backend {
            CacheBackend::LocalLru => match LruMemoryCache::new(self.capacity) {
                Ok(cache) => Arc::new(cache),
                Err(_) => Arc::new(LruMemoryCache::default()),
            },
        }
    }
}
