use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use crate::store::{
    BackendQuery, Entity, EntityIterator, EntityKey, EntityStoreProvider, PreparedQuery,
    QueryDirection,
};
use crossbeam_skiplist::SkipMap;
use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::Bound::{Excluded, Included, Unbounded};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

/// In-memory entity store backed by a concurrent skip list.
///
/// # Purpose
/// `InMemoryEntityStore` implements [EntityStoreProvider] entirely in memory. It
/// is used by tests and by embedded deployments that do not need durability.
///
/// # Characteristics
/// - **Thread-Safe**: clones share the same skip list
/// - **Key Ordered**: entities are kept in key order (kind, then name), which is
///   also the order of unsorted queries and scans
/// - **Datastore Semantics**: filters only match indexed properties, entities
///   lacking a sort property are left out of sorted results, and text or blob
///   values cannot be used as filter values
/// - **Closable**: after [close](InMemoryEntityStore::close) every operation
///   fails with `ErrorKind::BackendError`
#[derive(Clone, Default)]
pub struct InMemoryEntityStore {
    inner: Arc<InMemoryEntityStoreInner>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        InMemoryEntityStore {
            inner: Arc::new(InMemoryEntityStoreInner::new()),
        }
    }

    /// Closes the store. All later operations fail.
    pub fn close(&self) {
        self.inner.closed.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(AtomicOrdering::Relaxed)
    }

    /// Returns the number of entities across all kinds.
    pub fn len(&self) -> usize {
        self.inner.backing_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.backing_map.is_empty()
    }
}

impl EntityStoreProvider for InMemoryEntityStore {
    fn put(&self, entity: Entity) -> RepositoryResult<()> {
        self.inner.put(entity)
    }

    fn get(&self, key: &EntityKey) -> RepositoryResult<Option<Entity>> {
        self.inner.get(key)
    }

    fn delete(&self, key: &EntityKey) -> RepositoryResult<()> {
        self.inner.delete(key)
    }

    fn prepare_query(&self, query: &BackendQuery) -> RepositoryResult<PreparedQuery> {
        self.inner.prepare_query(query)
    }

    fn count(&self, query: &PreparedQuery) -> RepositoryResult<u64> {
        self.inner.count(query)
    }

    fn fetch_page(
        &self,
        query: &PreparedQuery,
        offset: u64,
        limit: u64,
    ) -> RepositoryResult<Vec<Entity>> {
        self.inner.fetch_page(query, offset, limit)
    }

    fn scan_all(&self, kind: &str) -> RepositoryResult<EntityIterator> {
        self.inner.check_opened()?;
        Ok(Box::new(KindScan::new(self.inner.clone(), kind)))
    }
}

#[derive(Default)]
pub(crate) struct InMemoryEntityStoreInner {
    backing_map: SkipMap<EntityKey, Entity>,
    closed: AtomicBool,
}

impl InMemoryEntityStoreInner {
    fn new() -> Self {
        InMemoryEntityStoreInner {
            backing_map: SkipMap::new(),
            closed: AtomicBool::new(false),
        }
    }

    fn check_opened(&self) -> RepositoryResult<()> {
        if self.closed.load(AtomicOrdering::Relaxed) {
            log::error!("Entity store is closed");
            return Err(RepositoryError::new(
                "Entity store is closed",
                ErrorKind::BackendError,
            ));
        }
        Ok(())
    }

    fn put(&self, entity: Entity) -> RepositoryResult<()> {
        self.check_opened()?;
        self.backing_map.insert(entity.key().clone(), entity);
        Ok(())
    }

    fn get(&self, key: &EntityKey) -> RepositoryResult<Option<Entity>> {
        self.check_opened()?;
        Ok(self.backing_map.get(key).map(|entry| entry.value().clone()))
    }

    fn delete(&self, key: &EntityKey) -> RepositoryResult<()> {
        self.check_opened()?;
        self.backing_map.remove(key);
        Ok(())
    }

    fn prepare_query(&self, query: &BackendQuery) -> RepositoryResult<PreparedQuery> {
        self.check_opened()?;

        if query.kind().is_empty() {
            log::error!("Query kind cannot be empty");
            return Err(RepositoryError::new(
                "Query kind cannot be empty",
                ErrorKind::BackendError,
            ));
        }

        for filter in query.filters() {
            if !filter.value.is_indexed() {
                log::error!(
                    "Filter on property[{}] uses an unindexed {} value",
                    filter.property,
                    filter.value.type_name()
                );
                return Err(RepositoryError::new(
                    &format!(
                        "Filter on property[{}] uses an unindexed {} value",
                        filter.property,
                        filter.value.type_name()
                    ),
                    ErrorKind::BackendError,
                ));
            }
        }

        Ok(PreparedQuery::new(query.clone()))
    }

    fn count(&self, query: &PreparedQuery) -> RepositoryResult<u64> {
        self.check_opened()?;
        Ok(self.matching(query.query()).len() as u64)
    }

    fn fetch_page(
        &self,
        query: &PreparedQuery,
        offset: u64,
        limit: u64,
    ) -> RepositoryResult<Vec<Entity>> {
        self.check_opened()?;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(self
            .matching(query.query())
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    fn kind_entries(&self, kind: &str) -> impl Iterator<Item = Entity> + '_ {
        let lower = EntityKey::new(kind, "", None);
        let kind = kind.to_string();
        self.backing_map
            .range((Included(lower), Unbounded))
            .take_while(move |entry| entry.key().kind() == kind)
            .map(|entry| entry.value().clone())
    }

    fn matching(&self, query: &BackendQuery) -> Vec<Entity> {
        let filtered = self
            .kind_entries(query.kind())
            .filter(|entity| query.filters().iter().all(|filter| filter.matches(entity)));

        if !query.is_sorted() {
            return filtered.collect();
        }

        // entities without an indexed value for every sort property are left out
        filtered
            .filter(|entity| {
                query.sorts().iter().all(|sort| {
                    entity
                        .property(&sort.property)
                        .is_some_and(|value| value.is_indexed())
                })
            })
            .sorted_by(|a, b| compare_by_sorts(query, a, b))
            .collect()
    }

    fn next_in_kind(&self, kind: &str, after: Option<&EntityKey>) -> Option<Entity> {
        let entry = match after {
            Some(key) => self.backing_map.range((Excluded(key), Unbounded)).next(),
            None => self
                .backing_map
                .range((Included(EntityKey::new(kind, "", None)), Unbounded))
                .next(),
        }?;

        if entry.key().kind() == kind {
            Some(entry.value().clone())
        } else {
            None
        }
    }
}

fn compare_by_sorts(query: &BackendQuery, a: &Entity, b: &Entity) -> Ordering {
    for sort in query.sorts() {
        let ordering = match (a.property(&sort.property), b.property(&sort.property)) {
            (Some(left), Some(right)) => left.index_cmp(right).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        };

        let ordering = match sort.direction {
            QueryDirection::Ascending => ordering,
            QueryDirection::Descending => ordering.reverse(),
        };

        if ordering.is_ne() {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Lazy scan over one kind. Each step re-enters the skip list after the last key
/// seen, so concurrent writes never invalidate the iterator.
struct KindScan {
    inner: Arc<InMemoryEntityStoreInner>,
    kind: String,
    last_key: Option<EntityKey>,
    done: bool,
}

impl KindScan {
    fn new(inner: Arc<InMemoryEntityStoreInner>, kind: &str) -> Self {
        KindScan {
            inner,
            kind: kind.to_string(),
            last_key: None,
            done: false,
        }
    }
}

impl Iterator for KindScan {
    type Item = RepositoryResult<Entity>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Err(err) = self.inner.check_opened() {
            self.done = true;
            return Some(Err(err));
        }

        match self.inner.next_in_kind(&self.kind, self.last_key.as_ref()) {
            Some(entity) => {
                self.last_key = Some(entity.key().clone());
                Some(Ok(entity))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}
