use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use rand::Rng;
use repono::collection::Document;
use repono::config::RepositoryConfig;
use repono::doc;
use repono::errors::{ErrorKind, RepositoryError, RepositoryResult};
use repono::repository::{Repository, RepositoryFactory};
use repono::store::{
    BackendQuery, Entity, EntityIterator, EntityKey, EntityStore, EntityStoreProvider,
    InMemoryEntityStore, PreparedQuery,
};
use std::collections::{HashMap, HashSet};
use std::backtrace::Backtrace;
use std::sync::Arc;
use std::time::Instant;

/// Runs a test between a setup and a teardown step.
///
/// `after` runs whether or not the test fails. Panics inside any step are
/// caught so that the failure report carries the step that failed.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> RepositoryResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> RepositoryResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> RepositoryResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let start_time = Instant::now();

    let result = std::panic::catch_unwind(|| {
        let backtrace = Backtrace::capture();
        match before() {
            Ok(ctx) => match test(ctx.clone()) {
                Ok(_) => after(ctx)
                    .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                Err(e) => {
                    let _ = after(ctx);
                    Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                }
            },
            Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
        }
    });

    let elapsed = start_time.elapsed();
    match result {
        Ok(Ok(_)) => {}
        Ok(Err((error, backtrace))) => {
            eprintln!("\n==================== TEST FAILED ({:?}) ====================", elapsed);
            eprintln!("{}", error);
            if !backtrace.is_empty() && !backtrace.contains("disabled") {
                eprintln!("\nBacktrace:\n{}", backtrace);
            }
            panic!("{}", error);
        }
        Err(panic_err) => {
            let message = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            panic!("Test panicked after {:?}: {}", elapsed, message);
        }
    }
}

#[derive(Clone)]
pub struct TestContext {
    store: RecordingStore,
    repository: Repository,
    factory: RepositoryFactory,
}

impl TestContext {
    pub fn new(store: RecordingStore, config: RepositoryConfig) -> RepositoryResult<Self> {
        let entity_store = EntityStore::new(store.clone());
        let repository = Repository::new("article", entity_store.clone(), config.clone())?;
        let factory = RepositoryFactory::new(entity_store, config);
        Ok(TestContext {
            store,
            repository,
            factory,
        })
    }

    pub fn store(&self) -> RecordingStore {
        self.store.clone()
    }

    /// Repository of kind `article`.
    pub fn repository(&self) -> Repository {
        self.repository.clone()
    }

    pub fn factory(&self) -> RepositoryFactory {
        self.factory.clone()
    }
}

pub fn create_test_context() -> RepositoryResult<TestContext> {
    TestContext::new(RecordingStore::new(), RepositoryConfig::default())
}

pub fn create_test_context_with(config: RepositoryConfig) -> RepositoryResult<TestContext> {
    TestContext::new(RecordingStore::new(), config)
}

pub fn cleanup(ctx: TestContext) -> RepositoryResult<()> {
    ctx.factory().clear();
    ctx.store().reset();
    Ok(())
}

/// Operations of [EntityStoreProvider], as recorded by [RecordingStore].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Put,
    Get,
    Delete,
    PrepareQuery,
    Count,
    FetchPage,
    ScanAll,
}

/// An in-memory store that records every call it receives and can be told to
/// fail.
#[derive(Clone)]
pub struct RecordingStore {
    delegate: InMemoryEntityStore,
    calls: Arc<Mutex<HashMap<StoreOp, usize>>>,
    failing: Arc<Mutex<HashSet<StoreOp>>>,
    broken_scan_position: Arc<Mutex<Option<usize>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        RecordingStore {
            delegate: InMemoryEntityStore::new(),
            calls: Arc::new(Mutex::new(HashMap::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
            broken_scan_position: Arc::new(Mutex::new(None)),
        }
    }

    pub fn calls(&self, op: StoreOp) -> usize {
        self.calls.lock().get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }

    /// Makes every later call of `op` fail with a backend error.
    pub fn fail_on(&self, op: StoreOp) {
        self.failing.lock().insert(op);
    }

    /// Makes every later scan yield a backend error in place of the record at
    /// `position`.
    pub fn fail_scan_at(&self, position: usize) {
        *self.broken_scan_position.lock() = Some(position);
    }

    pub fn reset(&self) {
        self.reset_calls();
        self.failing.lock().clear();
        *self.broken_scan_position.lock() = None;
    }

    pub fn entity_count(&self) -> usize {
        self.delegate.len()
    }

    fn record(&self, op: StoreOp) -> RepositoryResult<()> {
        *self.calls.lock().entry(op).or_insert(0) += 1;
        if self.failing.lock().contains(&op) {
            return Err(RepositoryError::new(
                &format!("Injected failure on {:?}", op),
                ErrorKind::BackendError,
            ));
        }
        Ok(())
    }
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStoreProvider for RecordingStore {
    fn put(&self, entity: Entity) -> RepositoryResult<()> {
        self.record(StoreOp::Put)?;
        self.delegate.put(entity)
    }

    fn get(&self, key: &EntityKey) -> RepositoryResult<Option<Entity>> {
        self.record(StoreOp::Get)?;
        self.delegate.get(key)
    }

    fn delete(&self, key: &EntityKey) -> RepositoryResult<()> {
        self.record(StoreOp::Delete)?;
        self.delegate.delete(key)
    }

    fn prepare_query(&self, query: &BackendQuery) -> RepositoryResult<PreparedQuery> {
        self.record(StoreOp::PrepareQuery)?;
        self.delegate.prepare_query(query)
    }

    fn count(&self, query: &PreparedQuery) -> RepositoryResult<u64> {
        self.record(StoreOp::Count)?;
        self.delegate.count(query)
    }

    fn fetch_page(
        &self,
        query: &PreparedQuery,
        offset: u64,
        limit: u64,
    ) -> RepositoryResult<Vec<Entity>> {
        self.record(StoreOp::FetchPage)?;
        self.delegate.fetch_page(query, offset, limit)
    }

    fn scan_all(&self, kind: &str) -> RepositoryResult<EntityIterator> {
        self.record(StoreOp::ScanAll)?;
        let scan = self.delegate.scan_all(kind)?;
        let broken_position = *self.broken_scan_position.lock();
        let scan: EntityIterator = match broken_position {
            Some(broken) => Box::new(scan.enumerate().map(move |(position, entity)| {
                if position == broken {
                    Err(RepositoryError::new(
                        &format!("Injected scan failure at {}", position),
                        ErrorKind::BackendError,
                    ))
                } else {
                    entity
                }
            })),
            None => scan,
        };
        Ok(scan)
    }
}

/// Builds an article document with random content and no id.
pub fn generate_article() -> Document {
    let mut rng = rand::thread_rng();
    let view_count: i64 = rng.gen_range(0..10_000);
    let title: String = (0..12)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect();
    let created = Utc
        .timestamp_millis_opt(rng.gen_range(1_500_000_000_000i64..1_700_000_000_000))
        .single()
        .unwrap_or_else(Utc::now);

    doc! {
        "title": title,
        "viewCount": view_count,
        "rating": rng.gen_range(0.0f64..5.0),
        "published": rng.gen_bool(0.5),
        "created": created,
    }
}

/// Adds `count` articles whose `seq` field runs from 0 to `count - 1`.
pub fn insert_articles(repository: &Repository, count: usize) -> RepositoryResult<Vec<String>> {
    let mut ids = Vec::with_capacity(count);
    for seq in 0..count {
        let mut article = generate_article();
        article.put("seq", seq as i64)?;
        ids.push(repository.add(&article)?);
    }
    Ok(ids)
}
