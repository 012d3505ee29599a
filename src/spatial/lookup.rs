//! Nearest-element search and point extraction.

use ndarray::ArrayD;

use super::distance::DistanceMetric;
use crate::error::{FieldError, Result};
use crate::fields::StateField;
use crate::mesh::MeshIndex;
use crate::types::ElementIndex;

/// Nearest-neighbor lookup over element centroids.
///
/// A linear scan: every query measures the distance to all E centroids.
#[derive(Clone, Copy, Debug)]
pub struct SpatialLookup<'a> {
    mesh: &'a MeshIndex,
    metric: DistanceMetric,
}

impl<'a> SpatialLookup<'a> {
    pub fn new(mesh: &'a MeshIndex, metric: DistanceMetric) -> Self {
        Self { mesh, metric }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Element whose centroid is closest to `(lon, lat)`.
    ///
    /// Ties go to the lowest index.
    pub fn nearest(&self, lon: f64, lat: f64) -> Result<ElementIndex> {
        let centroids = self.mesh.centroids();
        let mut best: Option<(usize, f64)> = None;
        for (i, (&clon, &clat)) in centroids.lon.iter().zip(&centroids.lat).enumerate() {
            let d = self.metric.distance(lon, lat, clon, clat);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((i, d)),
            }
        }
        best.map(|(i, _)| ElementIndex::new(i))
            .ok_or_else(|| FieldError::InvalidMesh("mesh has no elements".into()))
    }

    /// [`nearest`](Self::nearest) for several points.
    pub fn nearest_many(&self, points: &[(f64, f64)]) -> Result<Vec<ElementIndex>> {
        points
            .iter()
            .map(|&(lon, lat)| self.nearest(lon, lat))
            .collect()
    }

    /// Use `index` when given, otherwise search.
    pub fn resolve(&self, lon: f64, lat: f64, index: Option<ElementIndex>) -> Result<ElementIndex> {
        match index {
            Some(i) if i.get() < self.mesh.n_elements() => Ok(i),
            Some(i) => Err(FieldError::shape(
                "element index",
                format!("< {}", self.mesh.n_elements()),
                i.to_string(),
            )),
            None => self.nearest(lon, lat),
        }
    }

    /// Values of `field` at the element nearest `(lon, lat)`, or at `index`
    /// when given.
    ///
    /// Time and level axes are kept; node fields are averaged over the
    /// element's corners.
    pub fn interpolate_at_point(
        &self,
        field: &StateField,
        lon: f64,
        lat: f64,
        index: Option<ElementIndex>,
    ) -> Result<(ElementIndex, ArrayD<f64>)> {
        let element = self.resolve(lon, lat, index)?;
        let values = self.mesh.column_at_element(field, element.get())?;
        Ok((element, values))
    }
}
