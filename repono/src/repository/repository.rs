use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::codec::EntityCodec;
use crate::collection::Document;
use crate::common::{Value, OBJECT_ID};
use crate::config::RepositoryConfig;
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use crate::query::{
    field, Filter, PagedQueryExecutor, QueryCompiler, QueryResult, SamplingExecutor, Sort,
};
use crate::store::{BackendQuery, EntityKey, EntityStore};

/// Hook that can extend the criteria of every paged query before it is
/// compiled.
///
/// Use it to scope a repository to a subset of records, or to force a default
/// ordering, without wrapping the repository itself.
pub trait QueryAugmenter: Send + Sync {
    /// Appends to, or rewrites, the caller's filters and sorts.
    fn augment(&self, filters: &mut Vec<Filter>, sorts: &mut Vec<Sort>);
}

/// A named collection of documents persisted in an entity store.
///
/// # Purpose
/// `Repository` is the public face of the crate. It takes schemaless documents,
/// gives them a time-ordered id, and persists them as entities of kind `name`
/// under the configured parent scope. Reads come back as documents again, either
/// one at a time, one page at a time, or as a random sample.
///
/// # Characteristics
/// - **Cheap to Clone**: all clones share one inner state through an `Arc`
/// - **Thread-Safe**: the repository only holds read-only config and shared handles
/// - **Last Write Wins**: there is no concurrency control between writers
/// - **Errors Before Effects**: ids, page parameters, value types and operators
///   are checked before the store is called; store failures come back as
///   `ErrorKind::PersistenceFailure` with the store error as cause
///
/// # Usage
/// ```rust
/// use repono::doc;
/// use repono::repository::Repository;
/// use repono::store::{EntityStore, InMemoryEntityStore};
///
/// let store = EntityStore::new(InMemoryEntityStore::new());
/// let articles = Repository::new("article", store, Default::default()).unwrap();
///
/// let id = articles.add(&doc! { "title": "Hello" }).unwrap();
/// let found = articles.get(&id).unwrap().unwrap();
/// assert_eq!(found.id(), Some(id.as_str()));
/// assert!(articles.has(&id).unwrap());
/// ```
#[derive(Clone)]
pub struct Repository {
    inner: Arc<RepositoryInner>,
}

impl Repository {
    /// Creates a repository named `name` over the given store.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the name is empty.
    pub fn new(name: &str, store: EntityStore, config: RepositoryConfig) -> RepositoryResult<Self> {
        Repository::create(name, store, config, None)
    }

    /// Creates a repository whose paged queries pass through `augmenter`.
    pub fn with_augmenter(
        name: &str,
        store: EntityStore,
        config: RepositoryConfig,
        augmenter: Arc<dyn QueryAugmenter>,
    ) -> RepositoryResult<Self> {
        Repository::create(name, store, config, Some(augmenter))
    }

    fn create(
        name: &str,
        store: EntityStore,
        config: RepositoryConfig,
        augmenter: Option<Arc<dyn QueryAugmenter>>,
    ) -> RepositoryResult<Self> {
        if name.is_empty() {
            log::error!("Repository name cannot be empty");
            return Err(RepositoryError::new(
                "Repository name cannot be empty",
                ErrorKind::InvalidConfiguration,
            ));
        }

        Ok(Repository {
            inner: Arc::new(RepositoryInner::new(name, store, config, augmenter)),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.inner.config
    }

    /// Adds a document and returns its id.
    ///
    /// A string `oId` in the document is used as the id; otherwise a new id is
    /// generated. The stored document always carries its id in `oId`.
    ///
    /// # Errors
    ///
    /// - `InvalidId` if `oId` is present but is not a non-empty string
    /// - `UnsupportedType` if a field holds a null, array or object
    /// - `PersistenceFailure` if the store rejects the write
    pub fn add(&self, document: &Document) -> RepositoryResult<String> {
        self.inner.add(document)
    }

    /// Replaces the document stored under `id`, creating it if absent. The
    /// document's own `oId` is overwritten with `id`.
    pub fn update(&self, id: &str, document: &Document) -> RepositoryResult<()> {
        self.inner.update(id, document)
    }

    /// Removes the document stored under `id`. Removing a missing id succeeds.
    pub fn remove(&self, id: &str) -> RepositoryResult<()> {
        self.inner.remove(id)
    }

    /// Returns the document stored under `id`, or `None` if there is none.
    pub fn get(&self, id: &str) -> RepositoryResult<Option<Document>> {
        self.inner.get(id)
    }

    /// Checks whether a document with `id` exists, using a count query rather
    /// than a fetch.
    pub fn has(&self, id: &str) -> RepositoryResult<bool> {
        self.inner.has(id)
    }

    /// Returns one page of documents in store order. Pages start at 1.
    pub fn get_page(&self, page_number: usize, page_size: usize) -> RepositoryResult<QueryResult> {
        self.inner.get_page(page_number, page_size, &[], &[])
    }

    /// Returns one page of documents ordered by `sorts`.
    pub fn get_page_sorted(
        &self,
        page_number: usize,
        page_size: usize,
        sorts: &[Sort],
    ) -> RepositoryResult<QueryResult> {
        self.inner.get_page(page_number, page_size, sorts, &[])
    }

    /// Returns one page of documents matching every filter, ordered by `sorts`.
    ///
    /// Documents lacking a sorted-on field are not part of a sorted result.
    pub fn get_page_filtered(
        &self,
        page_number: usize,
        page_size: usize,
        sorts: &[Sort],
        filters: &[Filter],
    ) -> RepositoryResult<QueryResult> {
        self.inner.get_page(page_number, page_size, sorts, filters)
    }

    /// Returns up to `fetch_size` distinct documents picked at random.
    ///
    /// Every document of the repository is read once, so this is costly on
    /// large repositories.
    pub fn get_randomly(&self, fetch_size: usize) -> RepositoryResult<Vec<Document>> {
        self.inner.get_randomly(fetch_size)
    }

    /// Returns the number of documents in the repository.
    pub fn count(&self) -> RepositoryResult<u64> {
        self.inner.count()
    }
}

impl Debug for Repository {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("name", &self.inner.name)
            .field("config", &self.inner.config)
            .finish()
    }
}

struct RepositoryInner {
    name: String,
    store: EntityStore,
    config: RepositoryConfig,
    codec: EntityCodec,
    paged_executor: PagedQueryExecutor,
    sampling_executor: SamplingExecutor,
    augmenter: Option<Arc<dyn QueryAugmenter>>,
}

impl RepositoryInner {
    fn new(
        name: &str,
        store: EntityStore,
        config: RepositoryConfig,
        augmenter: Option<Arc<dyn QueryAugmenter>>,
    ) -> Self {
        let codec = EntityCodec::new(config.max_string_length());
        RepositoryInner {
            name: name.to_string(),
            paged_executor: PagedQueryExecutor::new(store.clone(), codec),
            sampling_executor: SamplingExecutor::new(
                store.clone(),
                codec,
                config.sampling_strategy(),
            ),
            store,
            config,
            codec,
            augmenter,
        }
    }

    fn add(&self, document: &Document) -> RepositoryResult<String> {
        let id = match document.get(OBJECT_ID) {
            None => self.config.id_generator().generate(),
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(other) => {
                log::error!(
                    "Invalid {} value {} while adding to {}",
                    OBJECT_ID,
                    other,
                    self.name
                );
                return Err(RepositoryError::new(
                    &format!("{} must be a non-empty string, found {}", OBJECT_ID, other),
                    ErrorKind::InvalidId,
                ));
            }
        };

        self.put(&id, document, "add")?;
        log::debug!("Added document[{}] to {}", id, self.name);
        Ok(id)
    }

    fn update(&self, id: &str, document: &Document) -> RepositoryResult<()> {
        validate_id(id, "update")?;
        self.put(id, document, "update")?;
        log::debug!("Updated document[{}] in {}", id, self.name);
        Ok(())
    }

    fn put(&self, id: &str, document: &Document, operation: &str) -> RepositoryResult<()> {
        let mut document = document.clone();
        document.set_id(id);

        let entity = self.codec.to_entity(
            &document,
            &self.name,
            Some(self.config.parent_scope()),
            id,
        )?;
        self.wrap_backend(self.store.put(entity), operation, id)
    }

    fn remove(&self, id: &str) -> RepositoryResult<()> {
        validate_id(id, "remove")?;
        self.wrap_backend(self.store.delete(&self.key(id)), "remove", id)?;
        log::debug!("Removed document[{}] from {}", id, self.name);
        Ok(())
    }

    fn get(&self, id: &str) -> RepositoryResult<Option<Document>> {
        validate_id(id, "get")?;
        let entity = self.wrap_backend(self.store.get(&self.key(id)), "get", id)?;

        match entity {
            Some(entity) => Ok(Some(self.codec.to_document(&entity))),
            None => {
                log::warn!("Not found document[{}] in {}", id, self.name);
                Ok(None)
            }
        }
    }

    fn has(&self, id: &str) -> RepositoryResult<bool> {
        validate_id(id, "has")?;
        let query = QueryCompiler::compile(&self.name, &[field(OBJECT_ID).eq(id)], &[])?;
        let count = self.wrap_backend(self.count_query(&query), "has", id)?;
        Ok(count > 0)
    }

    fn get_page(
        &self,
        page_number: usize,
        page_size: usize,
        sorts: &[Sort],
        filters: &[Filter],
    ) -> RepositoryResult<QueryResult> {
        let mut filters = filters.to_vec();
        let mut sorts = sorts.to_vec();
        if let Some(augmenter) = &self.augmenter {
            augmenter.augment(&mut filters, &mut sorts);
        }

        let query = QueryCompiler::compile(&self.name, &filters, &sorts)?;
        let result = self.paged_executor.execute(&query, page_number, page_size);
        self.wrap_backend(result, "get page", &page_number.to_string())
    }

    fn get_randomly(&self, fetch_size: usize) -> RepositoryResult<Vec<Document>> {
        let result = self.sampling_executor.sample(&self.name, fetch_size);
        self.wrap_backend(result, "get randomly", &fetch_size.to_string())
    }

    fn count(&self) -> RepositoryResult<u64> {
        let result = self.count_query(&BackendQuery::new(&self.name));
        self.wrap_backend(result, "count", &self.name)
    }

    fn count_query(&self, query: &BackendQuery) -> RepositoryResult<u64> {
        let prepared = self.store.prepare_query(query)?;
        self.store.count(&prepared)
    }

    fn key(&self, id: &str) -> EntityKey {
        EntityKey::new(&self.name, id, Some(self.config.parent_scope().clone()))
    }

    // store errors become persistence failures; validation errors pass through
    fn wrap_backend<T>(
        &self,
        result: RepositoryResult<T>,
        operation: &str,
        context: &str,
    ) -> RepositoryResult<T> {
        match result {
            Err(err) if err.kind() == &ErrorKind::BackendError => {
                log::error!(
                    "Failed to {} [{}] in {}: {}",
                    operation,
                    context,
                    self.name,
                    err.message()
                );
                Err(RepositoryError::new_with_cause(
                    &format!("Failed to {} [{}] in {}", operation, context, self.name),
                    ErrorKind::PersistenceFailure,
                    err,
                ))
            }
            other => other,
        }
    }
}

fn validate_id(id: &str, operation: &str) -> RepositoryResult<()> {
    if id.is_empty() {
        log::error!("Id cannot be empty for {}", operation);
        return Err(RepositoryError::new(
            &format!("Id cannot be empty for {}", operation),
            ErrorKind::InvalidId,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::query::SortDirection;
    use crate::store::{EntityStoreProvider, InMemoryEntityStore, ParentScope, PropertyValue};

    #[ctor::ctor]
    fn init() {
        colog::init();
    }

    fn repository() -> (Repository, InMemoryEntityStore) {
        let memory = InMemoryEntityStore::new();
        let repository =
            Repository::new("article", EntityStore::new(memory.clone()), RepositoryConfig::default())
                .unwrap();
        (repository, memory)
    }

    #[test]
    fn test_add_generates_id() {
        let (repository, _) = repository();
        let id = repository.add(&doc! { "title": "a" }).unwrap();
        assert_eq!(id.len(), 13);
        assert!(id.chars().all(|c| c.is_ascii_digit()));

        let stored = repository.get(&id).unwrap().unwrap();
        assert_eq!(stored, doc! { "oId": id.clone(), "title": "a" });
    }

    #[test]
    fn test_add_keeps_existing_id() {
        let (repository, _) = repository();
        let id = repository.add(&doc! { "oId": "custom", "title": "a" }).unwrap();
        assert_eq!(id, "custom");
        assert!(repository.has("custom").unwrap());
    }

    #[test]
    fn test_add_rejects_non_string_id() {
        let (repository, memory) = repository();
        let err = repository.add(&doc! { "oId": 5 }).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidId);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_add_stores_under_parent_scope() {
        let (repository, memory) = repository();
        let id = repository.add(&doc! { "title": "a" }).unwrap();
        let key = EntityKey::new("article", &id, Some(ParentScope::default()));
        let entity = memory.get(&key).unwrap().unwrap();
        assert_eq!(entity.property(OBJECT_ID), Some(&PropertyValue::String(id)));
    }

    #[test]
    fn test_update_forces_id_and_replaces() {
        let (repository, _) = repository();
        let id = repository.add(&doc! { "title": "a", "extra": 1 }).unwrap();
        repository.update(&id, &doc! { "oId": "other", "title": "b" }).unwrap();

        let stored = repository.get(&id).unwrap().unwrap();
        assert_eq!(stored, doc! { "oId": id.clone(), "title": "b" });
        assert!(repository.get("other").unwrap().is_none());
        assert_eq!(repository.count().unwrap(), 1);
    }

    #[test]
    fn test_update_missing_id_inserts() {
        let (repository, _) = repository();
        repository.update("fresh", &doc! { "title": "x" }).unwrap();
        assert!(repository.has("fresh").unwrap());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (repository, _) = repository();
        let id = repository.add(&doc! { "title": "a" }).unwrap();
        repository.remove(&id).unwrap();
        repository.remove(&id).unwrap();
        assert!(repository.get(&id).unwrap().is_none());
        assert!(!repository.has(&id).unwrap());
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let (repository, _) = repository();
        assert_eq!(repository.get("").unwrap_err().kind(), &ErrorKind::InvalidId);
        assert_eq!(repository.has("").unwrap_err().kind(), &ErrorKind::InvalidId);
        assert_eq!(repository.remove("").unwrap_err().kind(), &ErrorKind::InvalidId);
        assert_eq!(
            repository.update("", &doc! { "a": 1 }).unwrap_err().kind(),
            &ErrorKind::InvalidId
        );
    }

    #[test]
    fn test_store_failure_becomes_persistence_failure() {
        let (repository, memory) = repository();
        memory.close();

        let err = repository.add(&doc! { "title": "a" }).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::PersistenceFailure);
        assert_eq!(err.cause().unwrap().kind(), &ErrorKind::BackendError);

        assert_eq!(repository.count().unwrap_err().kind(), &ErrorKind::PersistenceFailure);
        assert_eq!(repository.get("1").unwrap_err().kind(), &ErrorKind::PersistenceFailure);
    }

    #[test]
    fn test_validation_errors_pass_through() {
        let (repository, memory) = repository();
        memory.close();

        let err = repository.get_page(1, 0).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidPageSize);

        let err = repository
            .get_page_filtered(1, 10, &[], &[Filter::raw("a", "LIKE", 1)])
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedOperator);
    }

    #[test]
    fn test_unsupported_value_writes_nothing() {
        let (repository, memory) = repository();
        let mut document = doc! { "title": "a" };
        document.put("tags", Value::Array(vec![Value::from("x")])).unwrap();

        let err = repository.add(&document).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedType);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_sorted_page() {
        let (repository, _) = repository();
        for n in [3, 1, 2] {
            repository.add(&doc! { "n": n }).unwrap();
        }

        let page = repository
            .get_page_sorted(1, 10, &[Sort::new("n", SortDirection::Descending)])
            .unwrap();
        let values: Vec<_> = page.results().iter().map(|d| d.get("n").cloned().unwrap()).collect();
        assert_eq!(values, vec![Value::I64(3), Value::I64(2), Value::I64(1)]);
        assert_eq!(page.page_count(), 1);
    }

    struct PublishedOnly;

    impl QueryAugmenter for PublishedOnly {
        fn augment(&self, filters: &mut Vec<Filter>, _sorts: &mut Vec<Sort>) {
            filters.push(field("published").eq(true));
        }
    }

    #[test]
    fn test_augmenter_extends_paged_queries() {
        let repository = Repository::with_augmenter(
            "article",
            EntityStore::new(InMemoryEntityStore::new()),
            RepositoryConfig::default(),
            Arc::new(PublishedOnly),
        )
        .unwrap();
        repository.add(&doc! { "published": true }).unwrap();
        repository.add(&doc! { "published": false }).unwrap();

        assert_eq!(repository.get_page(1, 10).unwrap().len(), 1);
        assert_eq!(repository.count().unwrap(), 2);
    }

    #[test]
    fn test_get_randomly() {
        let (repository, _) = repository();
        for n in 0..10 {
            repository.add(&doc! { "n": n }).unwrap();
        }
        assert_eq!(repository.get_randomly(3).unwrap().len(), 3);
        assert_eq!(repository.get_randomly(30).unwrap().len(), 10);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = Repository::new(
            "",
            EntityStore::new(InMemoryEntityStore::new()),
            RepositoryConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidConfiguration);
    }
}
