//! Query criteria and the executors that run them.
//!
//! Callers describe what they want with [`Filter`] and [`Sort`] values. The
//! [`QueryCompiler`] turns those into a store-native query, which is then run
//! either one page at a time by the [`PagedQueryExecutor`] or sampled at random
//! by the [`SamplingExecutor`].

mod compiler;
mod criteria;
mod paged;
mod sampling;

pub use compiler::*;
pub use criteria::*;
pub use paged::*;
pub use sampling::*;
