//! Strongly-typed domain types for safer APIs.
//!
//! Index newtypes keep element and station positions apart;
//! [`GeoBounds`] describes the geographic extent of a mesh.

mod bounds;
mod indices;

pub use bounds::GeoBounds;
pub use indices::{ElementIndex, StationIndex};
