use im::OrdMap;

use crate::common::{Value, OBJECT_ID};
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

/// Represents a document stored in a repository.
///
/// A document is a flat mapping from a [String] key to a [Value]. Key order is
/// irrelevant to equality. The document is backed by `im::OrdMap`, so cloning is
/// O(1) and every clone is independent.
///
/// The `oId` field is reserved for the object id. A repository fills it in when a
/// document is added without one, and always overwrites it on update.
///
/// ```rust
/// use repono::doc;
///
/// let doc = doc! {
///     "title": "Hello",
///     "viewCount": 3,
/// };
/// assert_eq!(doc.size(), 2);
/// assert!(doc.id().is_none());
/// ```
#[derive(Clone, PartialEq, Default)]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of fields in the document.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates the specified [Value] with the specified key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFieldName` if the key is empty.
    pub fn put<T: Into<Value>>(&mut self, key: &str, value: T) -> RepositoryResult<()> {
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(RepositoryError::new(
                "Document does not support empty key",
                ErrorKind::InvalidFieldName,
            ));
        }

        self.data.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Returns the value for the key, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Removes the key and returns its value, if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the object id when `oId` holds a string.
    pub fn id(&self) -> Option<&str> {
        match self.data.get(OBJECT_ID) {
            Some(Value::String(id)) => Some(id.as_str()),
            _ => None,
        }
    }

    /// Sets the `oId` field, replacing any previous value.
    pub fn set_id(&mut self, id: &str) {
        self.data.insert(OBJECT_ID.to_string(), Value::String(id.to_string()));
    }

    /// Returns the field names in key order.
    pub fn fields(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.data
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Builds a document from a JSON object.
    ///
    /// Nested arrays, objects and nulls are kept as-is so that a repository can
    /// reject them with a precise error instead of silently dropping them.
    ///
    /// # Errors
    ///
    /// Returns `EncodingError` if the JSON value is not an object, and
    /// `InvalidFieldName` for an empty key.
    pub fn from_json(json: &serde_json::Value) -> RepositoryResult<Document> {
        let object = json.as_object().ok_or_else(|| {
            log::error!("Expected a JSON object but found {}", json);
            RepositoryError::new(
                "A document can only be built from a JSON object",
                ErrorKind::EncodingError,
            )
        })?;

        let mut document = Document::new();
        for (key, value) in object {
            document.put(key, Value::from_json(value))?;
        }
        Ok(document)
    }

    /// Parses a document from JSON text.
    pub fn from_json_str(json: &str) -> RepositoryResult<Document> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Document::from_json(&value)
    }

    /// Renders the document as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.data
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.data.iter()).finish()
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Builds a [Document] from `"key": value` pairs.
///
/// Values are converted with `Value::from`, so any type with a `From` conversion
/// into [Value] can be used.
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($key:literal : $value:expr),+ $(,)?) => {
        {
            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($key, $crate::common::Value::from($value))
                    .expect(&format!("Failed to put value for key {}", $key));
            )+
            doc
        }
    };
}
