//! Document repositories.
//!
//! A [`Repository`] is a named, schemaless document collection persisted as
//! entities of one kind. A [`RepositoryFactory`] keeps one repository per name
//! over a shared store.

mod repository;
mod repository_factory;

pub use repository::*;
pub use repository_factory::*;
