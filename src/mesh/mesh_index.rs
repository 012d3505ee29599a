//! Static topology of an unstructured triangular mesh.
//!
//! Connectivity follows FVCOM conventions:
//! - `trinodes[e]` = the three corner nodes of element `e`
//! - `triele[e]` = the three edge-adjacent elements of `e`, with `0` meaning
//!   "no neighbor" in the source data
//! - `a1u`, `a2u` = 4×E linear-reconstruction weights for ∂/∂x and ∂/∂y,
//!   row 0 weighting the element itself and rows 1–3 its neighbors
//!
//! The "no neighbor" sentinel is remapped once, at construction, to a ghost
//! index one past the last element. Gradient reconstruction pads every
//! element-indexed array with a zero column at that position, so boundary
//! elements read a zero contribution through plain indexing.

use ndarray::{Array1, Array2, ArrayD, ArrayView2, Axis};

use crate::error::{FieldError, Result};
use crate::fields::{FieldLayout, GridLocation, StateField};
use crate::types::GeoBounds;

/// Geographic and projected coordinates of a set of points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Coordinates {
    /// Longitude (degrees East)
    pub lon: Vec<f64>,
    /// Latitude (degrees North)
    pub lat: Vec<f64>,
    /// Projected x (m)
    pub x: Vec<f64>,
    /// Projected y (m)
    pub y: Vec<f64>,
}

impl Coordinates {
    pub fn new(lon: Vec<f64>, lat: Vec<f64>, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { lon, lat, x, y }
    }

    pub fn len(&self) -> usize {
        self.lon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }

    pub(crate) fn check(&self, what: &str) -> Result<()> {
        let n = self.lon.len();
        if self.lat.len() != n || self.x.len() != n || self.y.len() != n {
            return Err(FieldError::InvalidMesh(format!(
                "{} coordinates have inconsistent lengths (lon {}, lat {}, x {}, y {})",
                what,
                n,
                self.lat.len(),
                self.x.len(),
                self.y.len()
            )));
        }
        Ok(())
    }
}

/// Read-only mesh topology, coefficients and vertical grid.
///
/// Build with [`MeshIndexBuilder`](super::MeshIndexBuilder).
#[derive(Clone, Debug)]
pub struct MeshIndex {
    pub(super) nodes: Coordinates,
    pub(super) centroids: Coordinates,
    pub(super) trinodes: Vec<[usize; 3]>,
    pub(super) triele: Vec<[usize; 3]>,
    pub(super) a1u: Option<Array2<f64>>,
    pub(super) a2u: Option<Array2<f64>>,
    pub(super) siglay: StateField,
    pub(super) siglev: Option<StateField>,
    pub(super) h: StateField,
}

impl MeshIndex {
    /// Create a builder.
    pub fn builder() -> super::MeshIndexBuilder {
        super::MeshIndexBuilder::new()
    }

    // =========================================================================
    // Dimensions
    // =========================================================================

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn n_elements(&self) -> usize {
        self.trinodes.len()
    }

    /// Number of sigma layers (rows of `siglay`).
    #[inline]
    pub fn n_levels(&self) -> usize {
        self.siglay.shape()[0]
    }

    /// Index that stands for "no neighbor" after remapping.
    ///
    /// Equal to [`n_elements`](Self::n_elements): out of range for any
    /// element-indexed array, in range for one padded with a ghost column.
    #[inline]
    pub fn ghost_index(&self) -> usize {
        self.trinodes.len()
    }

    #[inline]
    pub fn is_ghost(&self, index: usize) -> bool {
        index == self.ghost_index()
    }

    // =========================================================================
    // Connectivity
    // =========================================================================

    #[inline]
    pub fn trinodes(&self) -> &[[usize; 3]] {
        &self.trinodes
    }

    /// Remapped neighbor table.
    #[inline]
    pub fn triele(&self) -> &[[usize; 3]] {
        &self.triele
    }

    /// The three neighbor slots of `element` (ghost index where absent).
    #[inline]
    pub fn neighbors(&self, element: usize) -> [usize; 3] {
        self.triele[element]
    }

    /// Real (non-ghost) neighbors of `element`.
    pub fn real_neighbors(&self, element: usize) -> impl Iterator<Item = usize> + '_ {
        let ghost = self.ghost_index();
        self.triele[element].into_iter().filter(move |&n| n != ghost)
    }

    /// True if at least one edge of `element` is on the open/land boundary.
    pub fn is_boundary(&self, element: usize) -> bool {
        self.triele[element].iter().any(|&n| self.is_ghost(n))
    }

    /// Reconstruction weights for ∂/∂x, shape (4, E).
    pub fn a1u(&self) -> Result<ArrayView2<'_, f64>> {
        self.a1u
            .as_ref()
            .map(|a| a.view())
            .ok_or_else(|| FieldError::missing("a1u", "gradient reconstruction"))
    }

    /// Reconstruction weights for ∂/∂y, shape (4, E).
    pub fn a2u(&self) -> Result<ArrayView2<'_, f64>> {
        self.a2u
            .as_ref()
            .map(|a| a.view())
            .ok_or_else(|| FieldError::missing("a2u", "gradient reconstruction"))
    }

    // =========================================================================
    // Coordinates
    // =========================================================================

    #[inline]
    pub fn nodes(&self) -> &Coordinates {
        &self.nodes
    }

    #[inline]
    pub fn centroids(&self) -> &Coordinates {
        &self.centroids
    }

    /// Planar distance between the centroids of two elements.
    #[inline]
    pub fn centroid_distance(&self, a: usize, b: usize) -> f64 {
        let dx = self.centroids.x[b] - self.centroids.x[a];
        let dy = self.centroids.y[b] - self.centroids.y[a];
        (dx * dx + dy * dy).sqrt()
    }

    /// Lon/lat extent of the mesh nodes.
    pub fn bounding_box(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(&self.nodes.lon, &self.nodes.lat)
    }

    // =========================================================================
    // Vertical grid and bathymetry
    // =========================================================================

    /// Sigma layer positions, `(L, N)` or `(L, E)`.
    #[inline]
    pub fn siglay(&self) -> &StateField {
        &self.siglay
    }

    /// Sigma level positions, `(L+1, N)` or `(L+1, E)`, when the grid file
    /// carries them.
    #[inline]
    pub fn siglev(&self) -> Option<&StateField> {
        self.siglev.as_ref()
    }

    /// Bathymetry, `(N)` or `(E)`.
    #[inline]
    pub fn h(&self) -> &StateField {
        &self.h
    }

    // =========================================================================
    // Node → element reduction
    // =========================================================================

    /// Mean of a node-indexed vector over the corners of `element`.
    #[inline]
    pub fn element_mean(&self, node_values: &[f64], element: usize) -> f64 {
        let [a, b, c] = self.trinodes[element];
        (node_values[a] + node_values[b] + node_values[c]) / 3.0
    }

    /// Values of `field` at one element, time and level axes kept.
    ///
    /// Node-located fields are averaged over the element's corners with the
    /// same arithmetic as [`to_elements`](Self::to_elements).
    pub fn column_at_element(&self, field: &StateField, element: usize) -> Result<ArrayD<f64>> {
        if element >= self.n_elements() {
            return Err(FieldError::shape(
                field.name(),
                format!("element index < {}", self.n_elements()),
                element.to_string(),
            ));
        }
        match field.location() {
            GridLocation::Element => {
                self.check_space(field, self.n_elements())?;
                field.at_space(element)
            }
            GridLocation::Node => {
                self.check_space(field, self.n_nodes())?;
                let [a, b, c] = self.trinodes[element];
                let sum = field.at_space(a)? + field.at_space(b)? + field.at_space(c)?;
                Ok(sum / 3.0)
            }
            GridLocation::Station => Err(FieldError::shape(
                field.name(),
                "node or element field",
                "station field",
            )),
        }
    }

    /// Convert a field to element location (a copy if already there).
    pub fn to_elements(&self, field: &StateField) -> Result<StateField> {
        match field.location() {
            GridLocation::Element => {
                self.check_space(field, self.n_elements())?;
                Ok(field.clone())
            }
            GridLocation::Node => {
                self.check_space(field, self.n_nodes())?;
                let axis = Axis(field.values().ndim() - 1);
                let corner = |k: usize| -> Vec<usize> {
                    self.trinodes.iter().map(|tri| tri[k]).collect()
                };
                let a = field.values().select(axis, &corner(0));
                let b = field.values().select(axis, &corner(1));
                let c = field.values().select(axis, &corner(2));
                let mean = (a + b + c) / 3.0;
                StateField::new(field.name(), mean, field.layout(), GridLocation::Element)
            }
            GridLocation::Station => Err(FieldError::shape(
                field.name(),
                "node or element field",
                "station field",
            )),
        }
    }

    /// `siglay` at element centroids, `(L, E)`.
    pub fn siglay_elements(&self) -> Result<Array2<f64>> {
        Ok(self.to_elements(&self.siglay)?.view2()?.to_owned())
    }

    /// Bathymetry at element centroids, `(E)`.
    pub fn h_elements(&self) -> Result<Array1<f64>> {
        Ok(self.to_elements(&self.h)?.view1()?.to_owned())
    }

    /// `siglay` column at one element, `(L)`.
    pub fn siglay_at_element(&self, element: usize) -> Result<Array1<f64>> {
        let col = self.column_at_element(&self.siglay, element)?;
        col.into_dimensionality()
            .map_err(|_| FieldError::shape("siglay", "(level, space)", "other"))
    }

    /// Bathymetry at one element.
    pub fn h_at_element(&self, element: usize) -> Result<f64> {
        let col = self.column_at_element(&self.h, element)?;
        col.first()
            .copied()
            .ok_or_else(|| FieldError::shape("h", "(space)", "empty"))
    }

    fn check_space(&self, field: &StateField, expected: usize) -> Result<()> {
        if field.n_space() != expected {
            return Err(FieldError::shape(
                field.name(),
                format!("{} horizontal points", expected),
                field.n_space().to_string(),
            ));
        }
        Ok(())
    }
}

/// Layouts accepted for the static vertical grid.
pub(super) fn check_static(field: &StateField, layout: FieldLayout) -> Result<()> {
    if field.layout() != layout {
        return Err(FieldError::InvalidMesh(format!(
            "'{}' must have layout {:?}, got {:?}",
            field.name(),
            layout,
            field.layout()
        )));
    }
    if field.location() == GridLocation::Station {
        return Err(FieldError::InvalidMesh(format!(
            "'{}' must live on nodes or elements",
            field.name()
        )));
    }
    Ok(())
}
