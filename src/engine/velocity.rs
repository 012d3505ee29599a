//! Speed and direction kernels.
//!
//! Generic over dimension so the same arithmetic serves whole-domain arrays
//! and single-element columns.

use ndarray::{Array, ArrayView, Dimension, Zip};

/// `sqrt(u² + v²)`
pub fn speed<D: Dimension>(u: ArrayView<'_, f64, D>, v: ArrayView<'_, f64, D>) -> Array<f64, D> {
    Zip::from(u)
        .and(v)
        .map_collect(|&u, &v| (u * u + v * v).sqrt())
}

/// `sqrt(u² + v² + w²)`
pub fn speed_3d<D: Dimension>(
    u: ArrayView<'_, f64, D>,
    v: ArrayView<'_, f64, D>,
    w: ArrayView<'_, f64, D>,
) -> Array<f64, D> {
    Zip::from(u)
        .and(v)
        .and(w)
        .map_collect(|&u, &v, &w| (u * u + v * v + w * w).sqrt())
}

/// Flow direction in degrees, in (−180, 180]: 0 = East, 90 = North.
pub fn direction<D: Dimension>(u: ArrayView<'_, f64, D>, v: ArrayView<'_, f64, D>) -> Array<f64, D> {
    Zip::from(u).and(v).map_collect(|&u, &v| heading(u, v))
}

#[inline]
fn heading(u: f64, v: f64) -> f64 {
    let deg = v.atan2(u).to_degrees();
    if deg <= -180.0 {
        deg + 360.0
    } else {
        deg
    }
}
