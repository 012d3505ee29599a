//! Distance metrics between geographic points.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_371_008.8;

/// How horizontal distances to element centroids are measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean distance in lon/lat degrees.
    #[default]
    Planar,
    /// Great-circle distance in meters.
    Haversine,
}

impl DistanceMetric {
    /// Distance between `(lon1, lat1)` and `(lon2, lat2)` in degrees.
    ///
    /// Only the ordering of results is meaningful across metrics.
    #[inline]
    pub fn distance(self, lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
        match self {
            DistanceMetric::Planar => {
                let dx = lon2 - lon1;
                let dy = lat2 - lat1;
                (dx * dx + dy * dy).sqrt()
            }
            DistanceMetric::Haversine => haversine(lon1, lat1, lon2, lat2),
        }
    }
}

/// Great-circle distance in meters.
pub fn haversine(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_planar() {
        assert_eq!(DistanceMetric::Planar.distance(0.0, 0.0, 3.0, 4.0), 5.0);
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        let d = haversine(-66.0, 44.0, -66.0, 45.0);
        assert_relative_eq!(d, 111_195.0, max_relative = 1e-3);
        assert_eq!(haversine(1.0, 2.0, 1.0, 2.0), 0.0);
    }
}
