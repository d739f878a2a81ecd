use dashmap::DashMap;
use std::sync::Arc;

use crate::config::RepositoryConfig;
use crate::errors::RepositoryResult;
use crate::repository::Repository;
use crate::store::EntityStore;

/// Hands out one [Repository] per name over a shared store and config.
///
/// The first request for a name creates the repository; later requests return a
/// handle to the same instance. The factory is cheap to clone and all clones
/// share one registry.
#[derive(Clone)]
pub struct RepositoryFactory {
    inner: Arc<RepositoryFactoryInner>,
}

impl RepositoryFactory {
    pub fn new(store: EntityStore, config: RepositoryConfig) -> Self {
        RepositoryFactory {
            inner: Arc::new(RepositoryFactoryInner {
                store,
                config,
                repositories: DashMap::new(),
            }),
        }
    }

    /// Returns the repository registered under `name`, creating it on first use.
    pub fn get_repository(&self, name: &str) -> RepositoryResult<Repository> {
        self.inner.get_repository(name)
    }

    pub fn has_repository(&self, name: &str) -> bool {
        self.inner.repositories.contains_key(name)
    }

    /// Returns the names of every registered repository, sorted.
    pub fn repository_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .repositories
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Drops the registration for `name`. Stored documents are left untouched.
    pub fn remove_repository(&self, name: &str) -> bool {
        let removed = self.inner.repositories.remove(name).is_some();
        if removed {
            log::debug!("Removed repository registration {}", name);
        }
        removed
    }

    pub fn clear(&self) {
        self.inner.repositories.clear();
    }
}

struct RepositoryFactoryInner {
    store: EntityStore,
    config: RepositoryConfig,
    repositories: DashMap<String, Repository>,
}

impl RepositoryFactoryInner {
    fn get_repository(&self, name: &str) -> RepositoryResult<Repository> {
        if let Some(repository) = self.repositories.get(name) {
            return Ok(repository.clone());
        }

        let repository = self
            .repositories
            .entry(name.to_string())
            .or_try_insert_with(|| {
                log::debug!("Creating repository {}", name);
                Repository::new(name, self.store.clone(), self.config.clone())
            })?;
        Ok(repository.clone())
    }
}
