use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::common::Value;
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};

/// The comparison operators a [Filter] may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl FilterOperator {
    /// Returns the canonical wire name of the operator.
    pub fn name(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "EQUAL",
            FilterOperator::NotEqual => "NOT_EQUAL",
            FilterOperator::GreaterThan => "GREATER_THAN",
            FilterOperator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            FilterOperator::LessThan => "LESS_THAN",
            FilterOperator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
        }
    }
}

impl Display for FilterOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FilterOperator {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EQUAL" => Ok(FilterOperator::Equal),
            "NOT_EQUAL" => Ok(FilterOperator::NotEqual),
            "GREATER_THAN" => Ok(FilterOperator::GreaterThan),
            "GREATER_THAN_OR_EQUAL" => Ok(FilterOperator::GreaterThanOrEqual),
            "LESS_THAN" => Ok(FilterOperator::LessThan),
            "LESS_THAN_OR_EQUAL" => Ok(FilterOperator::LessThanOrEqual),
            _ => {
                log::error!("Unsupported filter operator[{}]", s);
                Err(RepositoryError::new(
                    &format!("Unsupported filter operator[{}]", s),
                    ErrorKind::UnsupportedOperator,
                ))
            }
        }
    }
}

/// A single filter criterion: `key <operator> value`.
///
/// Criteria usually arrive from the wire, so the operator is carried by name and
/// only resolved when the query is compiled. Filters built through
/// [Filter::new] or [field] always carry a canonical name.
///
/// ```rust
/// use repono::query::{field, Filter, FilterOperator};
///
/// let filter = field("viewCount").gt(10);
/// assert_eq!(filter, Filter::new("viewCount", FilterOperator::GreaterThan, 10));
/// assert_eq!(filter.operator(), "GREATER_THAN");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    key: String,
    operator: String,
    value: Value,
}

impl Filter {
    pub fn new<T: Into<Value>>(key: &str, operator: FilterOperator, value: T) -> Self {
        Filter {
            key: key.to_string(),
            operator: operator.name().to_string(),
            value: value.into(),
        }
    }

    /// Builds a filter with an unresolved operator name.
    pub fn raw<T: Into<Value>>(key: &str, operator: &str, value: T) -> Self {
        Filter {
            key: key.to_string(),
            operator: operator.to_string(),
            value: value.into(),
        }
    }

    /// Parses a filter from `{"key": .., "operator": .., "value": ..}`.
    pub fn from_json(json: &serde_json::Value) -> RepositoryResult<Filter> {
        let key = json.get("key").and_then(|k| k.as_str());
        let operator = json.get("operator").and_then(|o| o.as_str());
        let value = json.get("value");

        match (key, operator, value) {
            (Some(key), Some(operator), Some(value)) => {
                Ok(Filter::raw(key, operator, Value::from_json(value)))
            }
            _ => {
                log::error!("Malformed filter {}", json);
                Err(RepositoryError::new(
                    &format!("Malformed filter {}", json),
                    ErrorKind::EncodingError,
                ))
            }
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Resolves the operator name.
    pub fn resolve_operator(&self) -> RepositoryResult<FilterOperator> {
        self.operator.parse()
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.key, self.operator, self.value)
    }
}

/// Starts a fluent filter on a field.
pub fn field(key: &str) -> FluentFilter {
    FluentFilter {
        key: key.to_string(),
    }
}

/// Fluent builder returned by [field].
pub struct FluentFilter {
    key: String,
}

impl FluentFilter {
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(&self.key, FilterOperator::Equal, value)
    }

    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(&self.key, FilterOperator::NotEqual, value)
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(&self.key, FilterOperator::GreaterThan, value)
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(&self.key, FilterOperator::GreaterThanOrEqual, value)
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(&self.key, FilterOperator::LessThan, value)
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(&self.key, FilterOperator::LessThanOrEqual, value)
    }
}

/// Direction of a [Sort].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "ASCENDING"),
            SortDirection::Descending => write!(f, "DESCENDING"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortDirection::Ascending),
            "descending" | "desc" => Ok(SortDirection::Descending),
            _ => {
                log::error!("Unsupported sort direction[{}]", s);
                Err(RepositoryError::new(
                    &format!("Unsupported sort direction[{}]", s),
                    ErrorKind::UnsupportedOperator,
                ))
            }
        }
    }
}

/// A sort criterion. In a list of sorts, earlier entries take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sort {
    key: String,
    direction: SortDirection,
}

impl Sort {
    pub fn new(key: &str, direction: SortDirection) -> Self {
        Sort {
            key: key.to_string(),
            direction,
        }
    }

    pub fn asc(key: &str) -> Self {
        Sort::new(key, SortDirection::Ascending)
    }

    pub fn desc(key: &str) -> Self {
        Sort::new(key, SortDirection::Descending)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}
