//! Conversion between documents and store entities.

use crate::collection::Document;
use crate::common::{Value, MAX_STRING_PROPERTY_LENGTH, OBJECT_ID};
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use crate::store::{Entity, EntityKey, ParentScope, PropertyValue};

/// Translates a [Document] into an [Entity] and back.
///
/// # Purpose
/// The entity store only persists a fixed set of property types, and caps the
/// length of indexed strings. The codec checks every field of a document
/// against that set and promotes oversized strings to unindexed large text, so
/// the repository never hands the store something it cannot keep.
///
/// # Characteristics
/// - **All or Nothing**: the whole document is validated before an entity is
///   returned
/// - **Lossless**: no field is dropped; `to_document(to_entity(d))` equals `d`
///   (large text comes back as a plain string with the same content)
/// - **Character Based**: the length threshold counts characters, not bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityCodec {
    max_string_length: usize,
}

impl EntityCodec {
    pub fn new(max_string_length: usize) -> Self {
        EntityCodec { max_string_length }
    }

    pub fn max_string_length(&self) -> usize {
        self.max_string_length
    }

    /// Encodes a document as an entity of `kind` named `id`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` naming the first offending field if any value
    /// is null, an array or an object.
    pub fn to_entity(
        &self,
        document: &Document,
        kind: &str,
        parent: Option<&ParentScope>,
        id: &str,
    ) -> RepositoryResult<Entity> {
        let mut entity = Entity::new(EntityKey::new(kind, id, parent.cloned()));
        for (key, value) in document.iter() {
            let property = self.encode_value(key, value)?;
            entity.set_property(key, property);
        }
        Ok(entity)
    }

    /// Decodes an entity back into a document.
    ///
    /// `oId` is always present: it comes from the stored property when that is
    /// a string, and from the key name otherwise.
    pub fn to_document(&self, entity: &Entity) -> Document {
        let mut document: Document = entity
            .properties()
            .iter()
            .map(|(key, property)| (key.clone(), decode_value(property)))
            .collect();

        if document.id().is_none() {
            document.set_id(entity.key().name());
        }
        document
    }

    /// Maps a single document value to a store property.
    ///
    /// The reserved `oId` always stays an indexed string, whatever its length.
    pub fn encode_value(&self, key: &str, value: &Value) -> RepositoryResult<PropertyValue> {
        match value {
            Value::String(s) | Value::Text(s) if key == OBJECT_ID => {
                Ok(PropertyValue::String(s.clone()))
            }
            Value::String(s) if s.chars().count() > self.max_string_length => {
                Ok(PropertyValue::Text(s.clone()))
            }
            _ => encode_filter_value(key, value),
        }
    }
}

impl Default for EntityCodec {
    fn default() -> Self {
        EntityCodec::new(MAX_STRING_PROPERTY_LENGTH)
    }
}

/// Maps a value used as a query operand to a store property.
///
/// Strings are never promoted to large text here; a filter compares against the
/// value the caller gave.
pub fn encode_filter_value(key: &str, value: &Value) -> RepositoryResult<PropertyValue> {
    match value {
        Value::String(s) => Ok(PropertyValue::String(s.clone())),
        Value::Text(s) => Ok(PropertyValue::Text(s.clone())),
        Value::I64(i) => Ok(PropertyValue::Integer(*i)),
        Value::F64(f) => Ok(PropertyValue::Double(*f)),
        Value::Bool(b) => Ok(PropertyValue::Boolean(*b)),
        Value::Timestamp(ts) => Ok(PropertyValue::Timestamp(*ts)),
        Value::Blob(bytes) => Ok(PropertyValue::Blob(bytes.clone())),
        Value::Null | Value::Array(_) | Value::Object(_) => {
            log::error!(
                "Unsupported type[{}] for property[{}]",
                value.type_name(),
                key
            );
            Err(RepositoryError::new(
                &format!(
                    "Unsupported type[{}] for property[{}]",
                    value.type_name(),
                    key
                ),
                ErrorKind::UnsupportedType,
            ))
        }
    }
}

fn decode_value(property: &PropertyValue) -> Value {
    match property {
        PropertyValue::String(s) | PropertyValue::Text(s) => Value::String(s.clone()),
        PropertyValue::Integer(i) => Value::I64(*i),
        PropertyValue::Double(f) => Value::F64(*f),
        PropertyValue::Boolean(b) => Value::Bool(*b),
        PropertyValue::Timestamp(ts) => Value::Timestamp(*ts),
        PropertyValue::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}
