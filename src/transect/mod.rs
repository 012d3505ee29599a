//! Transects: shortest element paths and the sections sampled along them.

mod path;
mod sample;

pub use path::{ElementGraph, Transect};
pub use sample::{TransectExtractor, TransectSection};
