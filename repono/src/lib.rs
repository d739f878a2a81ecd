#![allow(clippy::module_inception)]
//! # Repono - Document Repositories over an Entity Store
//!
//! Repono stores schemaless documents in a key-value entity store whose records
//! carry typed, optionally indexed properties. It gives every document a
//! time-ordered id, checks that each value is something the store can keep, and
//! answers paged, filtered and sorted queries as well as random samples.
//!
//! ## Key Features
//!
//! - **Schemaless Documents**: flat key-value documents with a reserved `oId` field
//! - **Typed Persistence**: oversized strings become unindexed large text; values
//!   the store cannot keep are rejected before anything is written
//! - **Paged Queries**: filters and sorts compiled to store-native queries, with an
//!   exact page count
//! - **Random Sampling**: distinct records picked uniformly at random
//! - **Pluggable Stores**: any [`EntityStoreProvider`](store::EntityStoreProvider);
//!   an in-memory store is included
//! - **Named Caches**: LRU document caches handed out by a [`CacheFactory`](cache::CacheFactory)
//!
//! ## Quick Start
//!
//! ```rust
//! use repono::doc;
//! use repono::config::RepositoryConfig;
//! use repono::query::{field, Sort};
//! use repono::repository::Repository;
//! use repono::store::{EntityStore, InMemoryEntityStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = EntityStore::new(InMemoryEntityStore::new());
//! let articles = Repository::new("article", store, RepositoryConfig::default())?;
//!
//! articles.add(&doc! { "title": "First", "viewCount": 10 })?;
//! articles.add(&doc! { "title": "Second", "viewCount": 3 })?;
//!
//! let page = articles.get_page_filtered(
//!     1,
//!     10,
//!     &[Sort::desc("viewCount")],
//!     &[field("viewCount").gt(5)],
//! )?;
//! assert_eq!(page.len(), 1);
//! assert_eq!(page.page_count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Pattern
//!
//! Public handles ([`Repository`](repository::Repository),
//! [`EntityStore`](store::EntityStore), [`RepositoryFactory`](repository::RepositoryFactory),
//! [`CacheFactory`](cache::CacheFactory)) wrap their state in an `Arc`, so they are
//! cheap to clone and every clone sees the same data.
//!
//! ## Module Organization
//!
//! - [`cache`] - Named document caches
//! - [`codec`] - Document to entity conversion
//! - [`collection`] - Documents
//! - [`common`] - Values, constants and id generation
//! - [`config`] - Repository configuration
//! - [`errors`] - Error types and result definitions
//! - [`query`] - Query criteria, compilation, paging and sampling
//! - [`repository`] - Repositories and the repository factory
//! - [`store`] - Entity store abstractions and the in-memory store

pub mod cache;
pub mod codec;
pub mod collection;
pub mod common;
pub mod config;
pub mod errors;
pub mod query;
pub mod repository;
pub mod store;

pub use collection::Document;
pub use common::Value;
pub use errors::{ErrorKind, RepositoryError, RepositoryResult};
pub use repository::Repository;
