use crate::codec::encode_filter_value;
use crate::errors::RepositoryResult;
use crate::query::{Filter, FilterOperator, Sort, SortDirection};
use crate::store::{BackendQuery, QueryDirection, QueryFilter, QueryOperator, QuerySort};

/// Compiles caller criteria into a store-native [BackendQuery].
///
/// Filters are added first, then sorts, each in caller order. The compiler
/// checks operators and value kinds only; whether a key exists or a value type
/// fits is left to the store.
pub struct QueryCompiler;

impl QueryCompiler {
    pub fn compile(kind: &str, filters: &[Filter], sorts: &[Sort]) -> RepositoryResult<BackendQuery> {
        let mut query = BackendQuery::new(kind);

        for filter in filters {
            let operator = filter.resolve_operator()?;
            let value = encode_filter_value(filter.key(), filter.value())?;
            query.add_filter(QueryFilter::new(filter.key(), to_query_operator(operator), value));
        }

        for sort in sorts {
            query.add_sort(QuerySort::new(sort.key(), to_query_direction(sort.direction())));
        }

        log::trace!("Compiled query {}", query);
        Ok(query)
    }
}

fn to_query_operator(operator: FilterOperator) -> QueryOperator {
    match operator {
        FilterOperator::Equal => QueryOperator::Equal,
        FilterOperator::NotEqual => QueryOperator::NotEqual,
        FilterOperator::GreaterThan => QueryOperator::GreaterThan,
        FilterOperator::GreaterThanOrEqual => QueryOperator::GreaterThanOrEqual,
        FilterOperator::LessThan => QueryOperator::LessThan,
        FilterOperator::LessThanOrEqual => QueryOperator::LessThanOrEqual,
    }
}

fn to_query_direction(direction: SortDirection) -> QueryDirection {
    match direction {
        SortDirection::Ascending => QueryDirection::Ascending,
        SortDirection::Descending => QueryDirection::Descending,
    }
}
