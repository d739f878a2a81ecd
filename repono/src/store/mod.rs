//! Entity store abstractions.
//!
//! A repository persists documents into an entity store: a key-value store whose
//! records are [`Entity`] values with a typed property set. The store is pluggable
//! through the [`EntityStoreProvider`] trait and shared through the cheap-to-clone
//! [`EntityStore`] handle.
//!
//! # Queries
//!
//! Reads go through store-native [`BackendQuery`] values: filter clauses and sort
//! clauses over one kind. The store validates a query in `prepare_query` and then
//! counts, pages or scans the resulting [`PreparedQuery`].
//!
//! # Implementations
//!
//! - [`InMemoryEntityStore`]: concurrent skip list store for tests and embedded use

mod entity;
mod entity_store;
pub mod memory;
mod query;

pub use entity::*;
pub use entity_store::*;
pub use memory::*;
pub use query::*;
