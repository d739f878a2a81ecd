use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};

use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};

/// Represents a [Document](crate::collection::Document) value.
///
/// # Purpose
/// A document is a flat mapping from string key to a primitive value. The entity
/// store behind a repository only understands a fixed set of primitive kinds, so
/// `Value` separates the kinds that can be persisted from the ones that can only
/// arrive through the JSON wire format.
///
/// # Variants
/// Supported by the entity store:
/// - String(String): plain text value
/// - Text(String): large text value, never indexed by the store
/// - I64(i64) / F64(f64): numbers
/// - Bool(bool): boolean value
/// - Timestamp(DateTime<Utc>): point in time
/// - Blob(Vec<u8>): binary data, never indexed by the store
///
/// Carried for wire compatibility but rejected when persisted:
/// - Null, Array(Vec<Value>), Object(BTreeMap<String, Value>)
///
/// # Equality
/// `String` and `Text` holding the same content are equal, and an `I64` equals an
/// `F64` holding the same number. This keeps a document equal to itself after a
/// trip through the store, where oversized strings are promoted to large text.
#[derive(Clone, Default)]
pub enum Value {
    /// Represents a null value.
    #[default]
    Null,
    /// Represents a boolean value.
    Bool(bool),
    /// Represents a signed 64-bit integer value.
    I64(i64),
    /// Represents a 64-bit floating point value.
    F64(f64),
    /// Represents a plain string value.
    String(String),
    /// Represents a large text value.
    Text(String),
    /// Represents a UTC timestamp.
    Timestamp(DateTime<Utc>),
    /// Represents a byte array value.
    Blob(Vec<u8>),
    /// Represents a nested array. Not persistable.
    Array(Vec<Value>),
    /// Represents a nested object. Not persistable.
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Returns `true` if the entity store can persist this value kind.
    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            Value::Bool(_)
                | Value::I64(_)
                | Value::F64(_)
                | Value::String(_)
                | Value::Text(_)
                | Value::Timestamp(_)
                | Value::Blob(_)
        )
    }

    /// Returns a stable name of the value kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::I64(_) => "integer",
            Value::F64(_) => "double",
            Value::String(_) => "string",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::Blob(_) => "blob",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::I64(_) | Value::F64(_))
    }

    /// Returns `true` for both plain strings and large text.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_) | Value::Text(_))
    }

    pub fn as_bool(&self) -> Option<&bool> {
        match self {
            Value::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<&i64> {
        match self {
            Value::I64(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&f64> {
        match self {
            Value::F64(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the string content of a `String` or a `Text` value.
    pub fn as_string(&self) -> Option<&String> {
        match self {
            Value::String(value) | Value::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Timestamp(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Vec<u8>> {
        match self {
            Value::Blob(value) => Some(value),
            _ => None,
        }
    }

    /// Converts a JSON value into a `Value`.
    ///
    /// Integral JSON numbers that fit in an `i64` become [Value::I64], every other
    /// number becomes [Value::F64]. Strings stay strings: timestamps and blobs have
    /// no JSON representation of their own and are never inferred.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Bool(*value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => Value::I64(value),
                None => Value::F64(number.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(value) => Value::String(value.clone()),
            serde_json::Value::Array(values) => {
                Value::Array(values.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Value::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Converts this value into JSON.
    ///
    /// Timestamps render as RFC 3339 strings, blobs as standard base64 strings and
    /// non-finite doubles as null.
    pub fn to_json(&self) -> serde_json::Value {
        use base64::Engine as _;

        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(value) => serde_json::Value::Bool(*value),
            Value::I64(value) => serde_json::Value::from(*value),
            Value::F64(value) => serde_json::Number::from_f64(*value)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(value) | Value::Text(value) => serde_json::Value::String(value.clone()),
            Value::Timestamp(value) => serde_json::Value::String(value.to_rfc3339()),
            Value::Blob(value) => serde_json::Value::String(
                base64::engine::general_purpose::STANDARD.encode(value),
            ),
            Value::Array(values) => {
                serde_json::Value::Array(values.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::I64(a), Value::F64(b)) | (Value::F64(b), Value::I64(a)) => (*a as f64) == *b,
            (
                Value::String(a) | Value::Text(a),
                Value::String(b) | Value::Text(b),
            ) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Blob(a), Value::Blob(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(value) => write!(f, "Bool({})", value),
            Value::I64(value) => write!(f, "I64({})", value),
            Value::F64(value) => write!(f, "F64({})", value),
            Value::String(value) => write!(f, "String({:?})", value),
            Value::Text(value) => write!(f, "Text({} chars)", value.chars().count()),
            Value::Timestamp(value) => write!(f, "Timestamp({})", value.to_rfc3339()),
            Value::Blob(value) => write!(f, "Blob({} bytes)", value.len()),
            Value::Array(values) => f.debug_list().entries(values).finish(),
            Value::Object(map) => f.debug_map().entries(map).finish(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! value_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::I64(i64::from(value))
                }
            }
        )*
    };
}

value_from_integer!(i8, u8, i16, u16, i32, u32, i64);

impl TryFrom<u64> for Value {
    type Error = RepositoryError;

    fn try_from(value: u64) -> RepositoryResult<Self> {
        i64::try_from(value).map(Value::I64).map_err(|_| {
            log::error!("Integer value {} does not fit in a 64-bit signed integer", value);
            RepositoryError::new(
                &format!("Integer value {} does not fit in a 64-bit signed integer", value),
                ErrorKind::UnsupportedType,
            )
        })
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::F64(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Creates a [Value] from any convertible expression.
#[macro_export]
macro_rules! val {
    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
