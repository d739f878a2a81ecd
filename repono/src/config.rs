use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::common::{IdGenerator, TimeMillisIdGenerator, MAX_STRING_PROPERTY_LENGTH};
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use crate::query::SamplingStrategy;
use crate::store::ParentScope;

/// Settings shared by every repository created from it.
///
/// A config is read-only once built and is cheap to clone. Use
/// [RepositoryConfig::builder] to change any of the defaults:
///
/// - string property limit: 500 characters
/// - parent scope: `parentKind` / `parentKeyName`
/// - sampling strategy: positional scan
/// - id generator: [TimeMillisIdGenerator]
///
/// ```rust
/// use repono::config::RepositoryConfig;
/// use repono::query::SamplingStrategy;
///
/// let config = RepositoryConfig::builder()
///     .max_string_length(200)
///     .sampling_strategy(SamplingStrategy::Reservoir)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_string_length(), 200);
/// ```
#[derive(Clone)]
pub struct RepositoryConfig {
    max_string_length: usize,
    parent_scope: ParentScope,
    sampling_strategy: SamplingStrategy,
    id_generator: Arc<dyn IdGenerator>,
}

impl RepositoryConfig {
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::new()
    }

    pub fn max_string_length(&self) -> usize {
        self.max_string_length
    }

    pub fn parent_scope(&self) -> &ParentScope {
        &self.parent_scope
    }

    pub fn sampling_strategy(&self) -> SamplingStrategy {
        self.sampling_strategy
    }

    pub fn id_generator(&self) -> Arc<dyn IdGenerator> {
        self.id_generator.clone()
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            max_string_length: MAX_STRING_PROPERTY_LENGTH,
            parent_scope: ParentScope::default(),
            sampling_strategy: SamplingStrategy::default(),
            id_generator: Arc::new(TimeMillisIdGenerator::new()),
        }
    }
}

impl Debug for RepositoryConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryConfig")
            .field("max_string_length", &self.max_string_length)
            .field("parent_scope", &self.parent_scope)
            .field("sampling_strategy", &self.sampling_strategy)
            .finish_non_exhaustive()
    }
}

/// Builder for [RepositoryConfig].
pub struct RepositoryConfigBuilder {
    max_string_length: usize,
    parent_scope: ParentScope,
    sampling_strategy: SamplingStrategy,
    id_generator: Option<Arc<dyn IdGenerator>>,
}

impl RepositoryConfigBuilder {
    fn new() -> Self {
        RepositoryConfigBuilder {
            max_string_length: MAX_STRING_PROPERTY_LENGTH,
            parent_scope: ParentScope::default(),
            sampling_strategy: SamplingStrategy::default(),
            id_generator: None,
        }
    }

    /// Sets the longest string, in characters, stored as an indexed property.
    /// Longer strings are stored as unindexed large text.
    pub fn max_string_length(mut self, max_string_length: usize) -> Self {
        self.max_string_length = max_string_length;
        self
    }

    pub fn parent_scope(mut self, parent_scope: ParentScope) -> Self {
        self.parent_scope = parent_scope;
        self
    }

    pub fn sampling_strategy(mut self, sampling_strategy: SamplingStrategy) -> Self {
        self.sampling_strategy = sampling_strategy;
        self
    }

    pub fn id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(id_generator);
        self
    }

    /// Validates the settings and builds the config.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the string limit is zero or a part of
    /// the parent scope is empty.
    pub fn build(self) -> RepositoryResult<RepositoryConfig> {
        if self.max_string_length == 0 {
            log::error!("Max string length must be at least 1");
            return Err(RepositoryError::new(
                "Max string length must be at least 1",
                ErrorKind::InvalidConfiguration,
            ));
        }

        if self.parent_scope.kind().is_empty() || self.parent_scope.name().is_empty() {
            log::error!("Parent scope kind and name cannot be empty");
            return Err(RepositoryError::new(
                "Parent scope kind and name cannot be empty",
                ErrorKind::InvalidConfiguration,
            ));
        }

        Ok(RepositoryConfig {
            max_string_length: self.max_string_length,
            parent_scope: self.parent_scope,
            sampling_strategy: self.sampling_strategy,
            id_generator: self
                .id_generator
                .unwrap_or_else(|| Arc::new(TimeMillisIdGenerator::new())),
        })
    }
}
