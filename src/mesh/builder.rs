//! Builder for [`MeshIndex`].
//!
//! A grid loader hands over raw arrays; the builder validates shapes and
//! index ranges, fills in centroids from the corner nodes when the file has
//! none, and remaps the neighbor sentinel to the ghost index.
//!
//! ```
//! use fvcom_rs::fields::{GridLocation, StateField};
//! use fvcom_rs::mesh::{Coordinates, MeshIndex};
//! use ndarray::array;
//!
//! let nodes = Coordinates::new(
//!     vec![0.0, 1.0, 0.0],
//!     vec![0.0, 0.0, 1.0],
//!     vec![0.0, 1000.0, 0.0],
//!     vec![0.0, 0.0, 1000.0],
//! );
//! let mesh = MeshIndex::builder()
//!     .with_nodes(nodes)
//!     .with_trinodes(vec![[0, 1, 2]])
//!     .with_triele(vec![[0, 0, 0]])
//!     .with_siglay(StateField::level_space("siglay", array![[-0.5, -0.5, -0.5]], GridLocation::Node))
//!     .with_bathymetry(StateField::space("h", array![10.0, 10.0, 10.0], GridLocation::Node))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(mesh.n_elements(), 1);
//! assert!(mesh.is_boundary(0));
//! ```

use log::debug;
use ndarray::Array2;

use super::mesh_index::{check_static, Coordinates, MeshIndex};
use crate::error::{FieldError, Result};
use crate::fields::{FieldLayout, GridLocation, StateField};

/// How "no neighbor" is written in the incoming `triele` table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NeighborEncoding {
    /// 0-based indices where `0` also marks a missing neighbor.
    #[default]
    ZeroSentinel,
    /// 1-based indices (FVCOM `nbe`), `0` marks a missing neighbor.
    OneBased,
}

/// Fluent builder for [`MeshIndex`].
#[derive(Clone, Debug, Default)]
pub struct MeshIndexBuilder {
    nodes: Option<Coordinates>,
    centroids: Option<Coordinates>,
    trinodes: Option<Vec<[usize; 3]>>,
    triele: Option<Vec<[usize; 3]>>,
    encoding: NeighborEncoding,
    a1u: Option<Array2<f64>>,
    a2u: Option<Array2<f64>>,
    siglay: Option<StateField>,
    siglev: Option<StateField>,
    h: Option<StateField>,
}

impl MeshIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(mut self, nodes: Coordinates) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// Element centroid coordinates. Computed from `trinodes` if omitted.
    pub fn with_centroids(mut self, centroids: Coordinates) -> Self {
        self.centroids = Some(centroids);
        self
    }

    pub fn with_trinodes(mut self, trinodes: Vec<[usize; 3]>) -> Self {
        self.trinodes = Some(trinodes);
        self
    }

    /// Raw neighbor table, decoded according to the configured
    /// [`NeighborEncoding`]. Omitted tables mean "no neighbors anywhere".
    pub fn with_triele(mut self, triele: Vec<[usize; 3]>) -> Self {
        self.triele = Some(triele);
        self
    }

    pub fn with_neighbor_encoding(mut self, encoding: NeighborEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Gradient reconstruction weights, each 4×E.
    pub fn with_coefficients(mut self, a1u: Array2<f64>, a2u: Array2<f64>) -> Self {
        self.a1u = Some(a1u);
        self.a2u = Some(a2u);
        self
    }

    pub fn with_siglay(mut self, siglay: StateField) -> Self {
        self.siglay = Some(siglay);
        self
    }

    pub fn with_siglev(mut self, siglev: StateField) -> Self {
        self.siglev = Some(siglev);
        self
    }

    pub fn with_bathymetry(mut self, h: StateField) -> Self {
        self.h = Some(h);
        self
    }

    /// Validate and assemble the mesh.
    pub fn build(self) -> Result<MeshIndex> {
        let nodes = self
            .nodes
            .ok_or_else(|| FieldError::InvalidMesh("node coordinates are required".into()))?;
        nodes.check("node")?;
        let trinodes = self
            .trinodes
            .ok_or_else(|| FieldError::InvalidMesh("trinodes is required".into()))?;
        let n_nodes = nodes.len();
        let n_elements = trinodes.len();

        if let Some((e, tri)) = trinodes
            .iter()
            .enumerate()
            .find(|(_, tri)| tri.iter().any(|&n| n >= n_nodes))
        {
            return Err(FieldError::InvalidMesh(format!(
                "element {} references node {:?} but the mesh has {} nodes",
                e, tri, n_nodes
            )));
        }

        let centroids = match self.centroids {
            Some(c) => {
                c.check("centroid")?;
                if c.len() != n_elements {
                    return Err(FieldError::InvalidMesh(format!(
                        "{} centroids for {} elements",
                        c.len(),
                        n_elements
                    )));
                }
                c
            }
            None => centroids_from_nodes(&nodes, &trinodes),
        };

        let ghost = n_elements;
        let triele = match self.triele {
            Some(raw) => {
                if raw.len() != n_elements {
                    return Err(FieldError::InvalidMesh(format!(
                        "triele has {} rows for {} elements",
                        raw.len(),
                        n_elements
                    )));
                }
                remap_neighbors(&raw, self.encoding, ghost)?
            }
            None => vec![[ghost; 3]; n_elements],
        };
        let n_boundary = triele
            .iter()
            .filter(|row| row.contains(&ghost))
            .count();

        let check_coeff = |name: &str, a: &Option<Array2<f64>>| -> Result<()> {
            match a {
                Some(a) if a.shape() != [4, n_elements] => Err(FieldError::InvalidMesh(format!(
                    "{} must be 4×{}, got {:?}",
                    name,
                    n_elements,
                    a.shape()
                ))),
                _ => Ok(()),
            }
        };
        check_coeff("a1u", &self.a1u)?;
        check_coeff("a2u", &self.a2u)?;

        let siglay = self
            .siglay
            .ok_or_else(|| FieldError::InvalidMesh("siglay is required".into()))?;
        check_static(&siglay, FieldLayout::LevelSpace)?;
        check_horizontal(&siglay, n_nodes, n_elements)?;
        let n_levels = siglay.shape()[0];

        if let Some(siglev) = &self.siglev {
            check_static(siglev, FieldLayout::LevelSpace)?;
            check_horizontal(siglev, n_nodes, n_elements)?;
            if siglev.shape()[0] != n_levels + 1 {
                return Err(FieldError::InvalidMesh(format!(
                    "siglev must have {} levels, got {}",
                    n_levels + 1,
                    siglev.shape()[0]
                )));
            }
        }

        let h = self
            .h
            .ok_or_else(|| FieldError::InvalidMesh("bathymetry h is required".into()))?;
        check_static(&h, FieldLayout::Space)?;
        check_horizontal(&h, n_nodes, n_elements)?;

        debug!(
            "Mesh built: {} nodes, {} elements ({} on the boundary), {} sigma layers",
            n_nodes, n_elements, n_boundary, n_levels
        );

        Ok(MeshIndex {
            nodes,
            centroids,
            trinodes,
            triele,
            a1u: self.a1u,
            a2u: self.a2u,
            siglay,
            siglev: self.siglev,
            h,
        })
    }
}

/// Decode a raw neighbor table, sending every "no neighbor" slot to `ghost`.
pub fn remap_neighbors(
    raw: &[[usize; 3]],
    encoding: NeighborEncoding,
    ghost: usize,
) -> Result<Vec<[usize; 3]>> {
    let n_elements = ghost;
    raw.iter()
        .enumerate()
        .map(|(e, row)| {
            let mut out = [ghost; 3];
            for (slot, &n) in out.iter_mut().zip(row.iter()) {
                let decoded = match (encoding, n) {
                    (_, 0) => ghost,
                    (NeighborEncoding::ZeroSentinel, n) => n,
                    (NeighborEncoding::OneBased, n) => n - 1,
                };
                if decoded > n_elements {
                    return Err(FieldError::InvalidMesh(format!(
                        "element {} has neighbor {} but the mesh has {} elements",
                        e, n, n_elements
                    )));
                }
                *slot = decoded;
            }
            Ok(out)
        })
        .collect()
}

fn centroids_from_nodes(nodes: &Coordinates, trinodes: &[[usize; 3]]) -> Coordinates {
    let mean = |values: &[f64]| -> Vec<f64> {
        trinodes
            .iter()
            .map(|&[a, b, c]| (values[a] + values[b] + values[c]) / 3.0)
            .collect()
    };
    Coordinates::new(
        mean(&nodes.lon),
        mean(&nodes.lat),
        mean(&nodes.x),
        mean(&nodes.y),
    )
}

fn check_horizontal(field: &StateField, n_nodes: usize, n_elements: usize) -> Result<()> {
    let expected = match field.location() {
        GridLocation::Node => n_nodes,
        _ => n_elements,
    };
    if field.n_space() != expected {
        return Err(FieldError::InvalidMesh(format!(
            "'{}' is on {:?} but has {} horizontal points (expected {})",
            field.name(),
            field.location(),
            field.n_space(),
            expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn triangle_builder() -> MeshIndexBuilder {
        MeshIndexBuilder::new()
            .with_nodes(Coordinates::new(
                vec![0.0, 3.0, 0.0],
                vec![0.0, 0.0, 3.0],
                vec![0.0, 3.0, 0.0],
                vec![0.0, 0.0, 3.0],
            ))
            .with_trinodes(vec![[0, 1, 2]])
            .with_siglay(StateField::level_space(
                "siglay",
                array![[-0.25, -0.25, -0.25], [-0.75, -0.75, -0.75]],
                GridLocation::Node,
            ))
            .with_bathymetry(StateField::space("h", array![1.0, 2.0, 3.0], GridLocation::Node))
    }

    #[test]
    fn test_centroids_computed() {
        let mesh = triangle_builder().build().unwrap();
        assert_eq!(mesh.centroids().x, vec![1.0]);
        assert_eq!(mesh.centroids().y, vec![1.0]);
        assert_eq!(mesh.neighbors(0), [1, 1, 1]);
    }

    #[test]
    fn test_one_based_neighbors() {
        let raw = vec![[2, 0, 0], [1, 3, 0], [2, 0, 0]];
        let out = remap_neighbors(&raw, NeighborEncoding::OneBased, 3).unwrap();
        assert_eq!(out, vec![[1, 3, 3], [0, 2, 3], [1, 3, 3]]);

        let zero = remap_neighbors(&raw, NeighborEncoding::ZeroSentinel, 3).unwrap();
        assert_eq!(zero[0], [2, 3, 3]);
    }

    #[test]
    fn test_neighbor_out_of_range() {
        let err = remap_neighbors(&[[7, 0, 0]], NeighborEncoding::ZeroSentinel, 1);
        assert!(matches!(err, Err(FieldError::InvalidMesh(_))));
    }

    #[test]
    fn test_rejects_bad_node_reference() {
        let err = triangle_builder().with_trinodes(vec![[0, 1, 9]]).build();
        assert!(matches!(err, Err(FieldError::InvalidMesh(_))));
    }

    #[test]
    fn test_rejects_bad_coefficient_shape() {
        let err = triangle_builder()
            .with_coefficients(Array2::zeros((3, 1)), Array2::zeros((4, 1)))
            .build();
        assert!(matches!(err, Err(FieldError::InvalidMesh(_))));
    }

    #[test]
    fn test_rejects_siglev_level_count() {
        let err = triangle_builder()
            .with_siglev(StateField::level_space(
                "siglev",
                array![[0.0, 0.0, 0.0], [-1.0, -1.0, -1.0]],
                GridLocation::Node,
            ))
            .build();
        assert!(matches!(err, Err(FieldError::InvalidMesh(_))));
    }

    #[test]
    fn test_missing_siglay() {
        let err = MeshIndexBuilder::new()
            .with_nodes(Coordinates::default())
            .with_trinodes(vec![])
            .build();
        assert!(matches!(err, Err(FieldError::InvalidMesh(_))));
    }
}
