//! Geographic extent of a mesh or station set.

use std::fmt;

/// Longitude/latitude bounding box in decimal degrees.
///
/// ```
/// use fvcom_rs::types::GeoBounds;
///
/// let bounds = GeoBounds::from_points(&[-66.3, -66.1], &[44.2, 44.4]).unwrap();
/// assert!(bounds.contains(-66.2, 44.3));
/// assert!(!bounds.contains(-65.0, 44.3));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    /// Western edge (degrees East)
    pub lon_min: f64,
    /// Eastern edge (degrees East)
    pub lon_max: f64,
    /// Southern edge (degrees North)
    pub lat_min: f64,
    /// Northern edge (degrees North)
    pub lat_max: f64,
}

impl GeoBounds {
    /// Smallest box containing every `(lon[i], lat[i])`.
    ///
    /// Returns `None` for empty input or mismatched lengths.
    pub fn from_points(lon: &[f64], lat: &[f64]) -> Option<Self> {
        if lon.is_empty() || lon.len() != lat.len() {
            return None;
        }
        let (lon_min, lon_max) = min_max(lon);
        let (lat_min, lat_max) = min_max(lat);
        Some(Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        })
    }

    /// Check if a point lies inside (edges included).
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.lon_min && lon <= self.lon_max && lat >= self.lat_min && lat <= self.lat_max
    }

    /// Center as (lon, lat).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.lon_min + self.lon_max) / 2.0,
            (self.lat_min + self.lat_max) / 2.0,
        )
    }
}

impl fmt::Display for GeoBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
