use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::common::{DEFAULT_PARENT_KIND, DEFAULT_PARENT_NAME};

/// Fixed ancestry key that groups every entity of a kind under one partition.
///
/// The parent scope is part of an entity's key and is never exposed to callers
/// as document data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParentScope {
    kind: String,
    name: String,
}

impl ParentScope {
    pub fn new(kind: &str, name: &str) -> Self {
        ParentScope {
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for ParentScope {
    fn default() -> Self {
        ParentScope::new(DEFAULT_PARENT_KIND, DEFAULT_PARENT_NAME)
    }
}

impl Display for ParentScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.kind, self.name)
    }
}

/// Identifies an entity: its kind, its name within the kind and its parent scope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityKey {
    kind: String,
    name: String,
    parent: Option<ParentScope>,
}

impl EntityKey {
    pub fn new(kind: &str, name: &str, parent: Option<ParentScope>) -> Self {
        EntityKey {
            kind: kind.to_string(),
            name: name.to_string(),
            parent,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&ParentScope> {
        self.parent.as_ref()
    }
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "{}/{}({})", parent, self.kind, self.name),
            None => write!(f, "{}({})", self.kind, self.name),
        }
    }
}

/// A property value as the entity store understands it.
///
/// Only these types can be persisted. `Text` and `Blob` are stored but not
/// indexed: they cannot be used in filters and never take part in ordering.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    String(String),
    Text(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Blob(Vec<u8>),
}

impl PropertyValue {
    /// Returns `true` if the store keeps an index entry for this value.
    pub fn is_indexed(&self) -> bool {
        !matches!(self, PropertyValue::Text(_) | PropertyValue::Blob(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "string",
            PropertyValue::Text(_) => "text",
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Double(_) => "double",
            PropertyValue::Boolean(_) => "boolean",
            PropertyValue::Timestamp(_) => "timestamp",
            PropertyValue::Blob(_) => "blob",
        }
    }

    // numbers < timestamps < booleans < strings
    fn type_rank(&self) -> u8 {
        match self {
            PropertyValue::Integer(_) | PropertyValue::Double(_) => 0,
            PropertyValue::Timestamp(_) => 1,
            PropertyValue::Boolean(_) => 2,
            PropertyValue::String(_) => 3,
            PropertyValue::Text(_) | PropertyValue::Blob(_) => u8::MAX,
        }
    }

    /// Compares two indexed values the way the store orders them.
    ///
    /// Values of different type classes are ordered by type rank. Integers and
    /// doubles compare numerically. Returns `None` if either side is unindexed.
    pub fn index_cmp(&self, other: &PropertyValue) -> Option<Ordering> {
        if !self.is_indexed() || !other.is_indexed() {
            return None;
        }

        let ordering = match (self, other) {
            (PropertyValue::Integer(a), PropertyValue::Integer(b)) => a.cmp(b),
            (PropertyValue::Integer(a), PropertyValue::Double(b)) => (*a as f64).total_cmp(b),
            (PropertyValue::Double(a), PropertyValue::Integer(b)) => a.total_cmp(&(*b as f64)),
            (PropertyValue::Double(a), PropertyValue::Double(b)) => a.total_cmp(b),
            (PropertyValue::Timestamp(a), PropertyValue::Timestamp(b)) => a.cmp(b),
            (PropertyValue::Boolean(a), PropertyValue::Boolean(b)) => a.cmp(b),
            (PropertyValue::String(a), PropertyValue::String(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        };
        Some(ordering)
    }
}

/// The store-native record: a key plus a typed property set.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    key: EntityKey,
    properties: BTreeMap<String, PropertyValue>,
}

impl Entity {
    pub fn new(key: EntityKey) -> Self {
        Entity {
            key,
            properties: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn kind(&self) -> &str {
        self.key.kind()
    }

    pub fn set_property(&mut self, name: &str, value: PropertyValue) {
        self.properties.insert(name.to_string(), value);
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}
