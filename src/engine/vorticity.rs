//! Horizontal vorticity from linear gradient reconstruction.
//!
//! For element `e` with neighbors `n1..n3`:
//!
//! ```text
//! ∂v/∂x ≈ a1u[0,e]·v[e] + a1u[1,e]·v[n1] + a1u[2,e]·v[n2] + a1u[3,e]·v[n3]
//! ∂u/∂y ≈ a2u[0,e]·u[e] + a2u[1,e]·u[n1] + a2u[2,e]·u[n2] + a2u[3,e]·u[n3]
//! ζ = ∂v/∂x − ∂u/∂y
//! ```
//!
//! Missing neighbors point at the ghost column, which holds zero.

use ndarray::{s, Array, Array2, Array3, ArrayView2, ArrayView3, Axis, Dimension};

use crate::mesh::MeshIndex;

/// Neighbor slots of every element, one vector per slot.
#[derive(Clone, Debug)]
pub struct NeighborColumns {
    slots: [Vec<usize>; 3],
}

impl NeighborColumns {
    pub fn from_mesh(mesh: &MeshIndex) -> Self {
        let slot = |k: usize| -> Vec<usize> { mesh.triele().iter().map(|row| row[k]).collect() };
        Self {
            slots: [slot(0), slot(1), slot(2)],
        }
    }

    pub fn slot(&self, k: usize) -> &[usize] {
        &self.slots[k]
    }
}

/// Weighted sum of an element-indexed `(L, E)` field over self and neighbors.
pub fn reconstruct(
    field: ArrayView2<'_, f64>,
    coeff: ArrayView2<'_, f64>,
    neighbors: &NeighborColumns,
) -> Array2<f64> {
    let (n_levels, n_elements) = field.dim();
    let mut padded = Array2::zeros((n_levels, n_elements + 1));
    padded.slice_mut(s![.., ..n_elements]).assign(&field);

    let mut out = &field * &coeff.row(0);
    for k in 0..3 {
        let gathered = padded.select(Axis(1), neighbors.slot(k));
        out = out + &(&gathered * &coeff.row(k + 1));
    }
    out
}

/// Same sum for one element, given its own and its neighbors' columns.
///
/// Ghost neighbors should be passed as zero columns.
pub fn reconstruct_columns<D: Dimension>(
    columns: &[Array<f64, D>; 4],
    weights: [f64; 4],
) -> Array<f64, D> {
    let mut out = &columns[0] * weights[0];
    for k in 1..4 {
        out = out + &(&columns[k] * weights[k]);
    }
    out
}

/// Vorticity for one time step of `(L, E)` velocity.
pub fn vorticity_step(
    u: ArrayView2<'_, f64>,
    v: ArrayView2<'_, f64>,
    a1u: ArrayView2<'_, f64>,
    a2u: ArrayView2<'_, f64>,
    neighbors: &NeighborColumns,
) -> Array2<f64> {
    let dvdx = reconstruct(v, a1u, neighbors);
    let dudy = reconstruct(u, a2u, neighbors);
    dvdx - dudy
}

/// Vorticity at the listed steps of `(T, L, E)` velocity, `(steps, L, E)`.
pub fn vorticity_series(
    u: ArrayView3<'_, f64>,
    v: ArrayView3<'_, f64>,
    a1u: ArrayView2<'_, f64>,
    a2u: ArrayView2<'_, f64>,
    neighbors: &NeighborColumns,
    steps: &[usize],
) -> Array3<f64> {
    let (_, n_levels, n_elements) = u.dim();
    let mut out = Array3::zeros((steps.len(), n_levels, n_elements));
    for (mut dst, &t) in out.outer_iter_mut().zip(steps) {
        let step = vorticity_step(
            u.index_axis(Axis(0), t),
            v.index_axis(Axis(0), t),
            a1u,
            a2u,
            neighbors,
        );
        dst.assign(&step);
    }
    out
}

/// Parallel version of [`vorticity_series`] using Rayon, one task per step.
#[cfg(feature = "parallel")]
pub fn vorticity_series_parallel(
    u: ArrayView3<'_, f64>,
    v: ArrayView3<'_, f64>,
    a1u: ArrayView2<'_, f64>,
    a2u: ArrayView2<'_, f64>,
    neighbors: &NeighborColumns,
    steps: &[usize],
) -> Array3<f64> {
    use rayon::prelude::*;

    let (_, n_levels, n_elements) = u.dim();
    let slices: Vec<Array2<f64>> = steps
        .par_iter()
        .map(|&t| {
            vorticity_step(
                u.index_axis(Axis(0), t),
                v.index_axis(Axis(0), t),
                a1u,
                a2u,
                neighbors,
            )
        })
        .collect();

    let mut out = Array3::zeros((steps.len(), n_levels, n_elements));
    for (mut dst, step) in out.outer_iter_mut().zip(&slices) {
        dst.assign(step);
    }
    out
}
