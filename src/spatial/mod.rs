//! Horizontal point lookup on the mesh.

mod distance;
mod lookup;

pub use distance::{haversine, DistanceMetric, EARTH_RADIUS};
pub use lookup::SpatialLookup;
