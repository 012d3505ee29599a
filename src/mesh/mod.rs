//! Unstructured triangular mesh.
//!
//! - [`MeshIndex`]: connectivity, reconstruction coefficients, sigma grid and
//!   bathymetry, with node → element reductions
//! - [`MeshIndexBuilder`]: validated construction from loader arrays

mod builder;
mod mesh_index;

pub use builder::{remap_neighbors, MeshIndexBuilder, NeighborEncoding};
pub use mesh_index::{Coordinates, MeshIndex};
