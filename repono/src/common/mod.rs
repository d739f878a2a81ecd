//! Common types shared across the crate: document values, constants and id
//! generation.

mod constants;
mod id_generator;
mod value;

pub use constants::*;
pub use id_generator::*;
pub use value::*;
