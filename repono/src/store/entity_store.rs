use crate::errors::RepositoryResult;
use crate::store::{BackendQuery, Entity, EntityKey, PreparedQuery};
use std::ops::Deref;
use std::sync::Arc;

/// A lazily evaluated sequence of entities produced by a store scan.
///
/// Each item is a result so that a store can report a failure part-way through
/// the scan.
pub type EntityIterator = Box<dyn Iterator<Item = RepositoryResult<Entity>> + Send>;

/// Low-level interface of the entity store a repository persists into.
///
/// # Purpose
/// Defines the operations a repository needs from a key-value entity store whose
/// records are typed property bags. The repository treats the store as an opaque
/// collaborator: connection lifecycle, durability and replication are the
/// store's own business.
///
/// # Errors
/// Implementations report their own failures with `ErrorKind::BackendError`.
/// Repositories wrap those in `ErrorKind::PersistenceFailure` before returning
/// them to callers.
///
/// # Implementations
/// - `InMemoryEntityStore`: skip list backed store for tests and embedded use
///
/// # Thread Safety
/// Implementers must be `Send + Sync`; a single store handle is shared by every
/// repository of a process.
pub trait EntityStoreProvider: Send + Sync {
    /// Inserts or fully replaces the entity stored under the entity's key.
    fn put(&self, entity: Entity) -> RepositoryResult<()>;

    /// Retrieves the entity stored under the key.
    ///
    /// # Returns
    /// * `Ok(Some(entity))` if the key exists
    /// * `Ok(None)` if it does not
    fn get(&self, key: &EntityKey) -> RepositoryResult<Option<Entity>>;

    /// Deletes the entity stored under the key. Deleting a missing key succeeds.
    fn delete(&self, key: &EntityKey) -> RepositoryResult<()>;

    /// Validates a query and returns a handle that can be counted, paged and
    /// scanned.
    fn prepare_query(&self, query: &BackendQuery) -> RepositoryResult<PreparedQuery>;

    /// Returns the exact number of entities matching the query.
    fn count(&self, query: &PreparedQuery) -> RepositoryResult<u64>;

    /// Returns at most `limit` matching entities starting at `offset`, in the
    /// query's sort order.
    ///
    /// Unsorted queries use a store-defined order that is stable within a call.
    fn fetch_page(
        &self,
        query: &PreparedQuery,
        offset: u64,
        limit: u64,
    ) -> RepositoryResult<Vec<Entity>>;

    /// Scans every entity of a kind in store order.
    fn scan_all(&self, kind: &str) -> RepositoryResult<EntityIterator>;
}

/// A cheap-to-clone, thread-safe handle to an [EntityStoreProvider].
///
/// ```rust
/// use repono::store::{EntityStore, InMemoryEntityStore};
///
/// let store = EntityStore::new(InMemoryEntityStore::new());
/// let shared = store.clone();
/// assert_eq!(shared.scan_all("article").unwrap().count(), 0);
/// ```
#[derive(Clone)]
pub struct EntityStore {
    inner: Arc<dyn EntityStoreProvider>,
}

impl EntityStore {
    /// Creates a new `EntityStore` wrapping a provider implementation.
    pub fn new<T: EntityStoreProvider + 'static>(inner: T) -> Self {
        EntityStore {
            inner: Arc::new(inner),
        }
    }

    /// Creates a handle from an already shared provider.
    pub fn from_arc(inner: Arc<dyn EntityStoreProvider>) -> Self {
        EntityStore { inner }
    }
}

impl Deref for EntityStore {
    type Target = Arc<dyn EntityStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
