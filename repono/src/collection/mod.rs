//! Documents, the unit of data a repository stores and returns.
//!
//! A `Document` is a flat key-value map whose values are [`Value`](crate::common::Value)s.
//! The `oId` field holds the object id.
//!
//! ```rust
//! use repono::collection::Document;
//!
//! let mut doc = Document::new();
//! doc.put("title", "Hello")?;
//! doc.put("viewCount", 3)?;
//! # Ok::<(), repono::errors::RepositoryError>(())
//! ```

mod document;

pub use document::*;
