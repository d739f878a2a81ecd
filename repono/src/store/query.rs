use std::fmt::{Display, Formatter};

use crate::store::{Entity, PropertyValue};

/// Comparison operators the entity store evaluates natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl Display for QueryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            QueryOperator::Equal => "=",
            QueryOperator::NotEqual => "!=",
            QueryOperator::GreaterThan => ">",
            QueryOperator::GreaterThanOrEqual => ">=",
            QueryOperator::LessThan => "<",
            QueryOperator::LessThanOrEqual => "<=",
        };
        write!(f, "{}", symbol)
    }
}

/// Sort directions the entity store evaluates natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryDirection {
    Ascending,
    Descending,
}

/// A single filter clause of a [BackendQuery].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub property: String,
    pub operator: QueryOperator,
    pub value: PropertyValue,
}

impl QueryFilter {
    pub fn new(property: &str, operator: QueryOperator, value: PropertyValue) -> Self {
        QueryFilter {
            property: property.to_string(),
            operator,
            value,
        }
    }

    /// Evaluates the clause against an entity.
    ///
    /// An entity matches only if it has the property, the stored value is indexed
    /// and the comparison holds. Values of different type classes never compare
    /// equal, so `NotEqual` matches them.
    pub fn matches(&self, entity: &Entity) -> bool {
        let Some(stored) = entity.property(&self.property) else {
            return false;
        };

        let Some(ordering) = stored.index_cmp(&self.value) else {
            return false;
        };

        match self.operator {
            QueryOperator::Equal => ordering.is_eq(),
            QueryOperator::NotEqual => ordering.is_ne(),
            QueryOperator::GreaterThan => ordering.is_gt(),
            QueryOperator::GreaterThanOrEqual => ordering.is_ge(),
            QueryOperator::LessThan => ordering.is_lt(),
            QueryOperator::LessThanOrEqual => ordering.is_le(),
        }
    }
}

impl Display for QueryFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {:?}", self.property, self.operator, self.value)
    }
}

/// A single sort clause of a [BackendQuery].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySort {
    pub property: String,
    pub direction: QueryDirection,
}

impl QuerySort {
    pub fn new(property: &str, direction: QueryDirection) -> Self {
        QuerySort {
            property: property.to_string(),
            direction,
        }
    }
}

/// A store-native query over one kind: filter clauses and sort clauses, each in
/// the order they were added.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendQuery {
    kind: String,
    filters: Vec<QueryFilter>,
    sorts: Vec<QuerySort>,
}

impl BackendQuery {
    pub fn new(kind: &str) -> Self {
        BackendQuery {
            kind: kind.to_string(),
            filters: Vec::new(),
            sorts: Vec::new(),
        }
    }

    pub fn add_filter(&mut self, filter: QueryFilter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    pub fn add_sort(&mut self, sort: QuerySort) -> &mut Self {
        self.sorts.push(sort);
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn filters(&self) -> &[QueryFilter] {
        &self.filters
    }

    pub fn sorts(&self) -> &[QuerySort] {
        &self.sorts
    }

    pub fn is_filtered(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        !self.sorts.is_empty()
    }
}

impl Display for BackendQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "kind={}", self.kind)?;
        for filter in &self.filters {
            write!(f, ", filter[{}]", filter)?;
        }
        for sort in &self.sorts {
            write!(f, ", sort[{} {:?}]", sort.property, sort.direction)?;
        }
        Ok(())
    }
}

/// A query the store has validated and can count, page and scan.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    query: BackendQuery,
}

impl PreparedQuery {
    pub fn new(query: BackendQuery) -> Self {
        PreparedQuery { query }
    }

    pub fn query(&self) -> &BackendQuery {
        &self.query
    }

    pub fn kind(&self) -> &str {
        self.query.kind()
    }
}
