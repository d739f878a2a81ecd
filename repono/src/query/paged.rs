use crate::codec::EntityCodec;
use crate::collection::Document;
use crate::common::{PAGINATION, PAGINATION_PAGE_COUNT, RESULTS};
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use crate::store::{BackendQuery, EntityStore};

/// Pagination metadata of a [QueryResult].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    page_count: u64,
}

impl Pagination {
    pub fn new(page_count: u64) -> Self {
        Pagination { page_count }
    }

    /// Total number of pages for the query, `ceil(total / page_size)`.
    pub fn page_count(&self) -> u64 {
        self.page_count
    }
}

/// One page of documents plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pagination: Pagination,
    results: Vec<Document>,
}

impl QueryResult {
    pub fn new(pagination: Pagination, results: Vec<Document>) -> Self {
        QueryResult {
            pagination,
            results,
        }
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn page_count(&self) -> u64 {
        self.pagination.page_count
    }

    pub fn results(&self) -> &[Document] {
        &self.results
    }

    pub fn into_results(self) -> Vec<Document> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Renders the wire envelope
    /// `{"pagination": {"paginationPageCount": N}, "rslts": [...]}`.
    pub fn to_json(&self) -> serde_json::Value {
        let results: Vec<serde_json::Value> = self.results.iter().map(|d| d.to_json()).collect();
        serde_json::json!({
            PAGINATION: { PAGINATION_PAGE_COUNT: self.pagination.page_count },
            RESULTS: results,
        })
    }
}

/// Number of pages needed to show `total` records `page_size` at a time.
pub fn page_count(total: u64, page_size: usize) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size as u64)
}

/// Runs a compiled query one page at a time.
///
/// Page numbers start at 1. Both parameters are validated before the store is
/// touched. The count is exact, so a page past the end comes back empty with
/// the real page count.
#[derive(Clone)]
pub struct PagedQueryExecutor {
    store: EntityStore,
    codec: EntityCodec,
}

impl PagedQueryExecutor {
    pub fn new(store: EntityStore, codec: EntityCodec) -> Self {
        PagedQueryExecutor { store, codec }
    }

    pub fn execute(
        &self,
        query: &BackendQuery,
        page_number: usize,
        page_size: usize,
    ) -> RepositoryResult<QueryResult> {
        validate_page(page_number, page_size)?;

        let prepared = self.store.prepare_query(query)?;
        let total = self.store.count(&prepared)?;
        let pages = page_count(total, page_size);

        let offset = (page_size as u64).saturating_mul(page_number as u64 - 1);
        let entities = if offset >= total {
            Vec::new()
        } else {
            self.store.fetch_page(&prepared, offset, page_size as u64)?
        };

        let results = entities
            .iter()
            .take(page_size)
            .map(|entity| self.codec.to_document(entity))
            .collect::<Vec<_>>();

        log::debug!(
            "Found page[{}] of kind[{}]: {} result(s), {} page(s)",
            page_number,
            query.kind(),
            results.len(),
            pages
        );
        Ok(QueryResult::new(Pagination::new(pages), results))
    }
}

fn validate_page(page_number: usize, page_size: usize) -> RepositoryResult<()> {
    if page_size == 0 {
        log::error!("Page size must be at least 1");
        return Err(RepositoryError::new(
            "Page size must be at least 1",
            ErrorKind::InvalidPageSize,
        ));
    }
    if page_number == 0 {
        log::error!("Page number must be at least 1");
        return Err(RepositoryError::new(
            "Page number must be at least 1",
            ErrorKind::InvalidPageNumber,
        ));
    }
    Ok(())
}
