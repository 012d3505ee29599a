//! Layer depth below the free surface.

use ndarray::{Array3, ArrayView1, ArrayView2, Axis, Zip};

/// `(el + h) * siglay` for every step, layer and column.
///
/// - `el`: `(T, E)` elevation
/// - `h`: `(E)` bathymetry
/// - `siglay`: `(L, E)` sigma layer positions
///
/// Returns `(T, L, E)`. Depth is 0 at the free surface and takes the sign of
/// `siglay` below it.
pub fn depth_kernel(
    el: ArrayView2<'_, f64>,
    h: ArrayView1<'_, f64>,
    siglay: ArrayView2<'_, f64>,
) -> Array3<f64> {
    let zeta = &el + &h;
    let (n_time, n_space) = zeta.dim();
    let n_levels = siglay.nrows();

    let mut depth = Array3::zeros((n_time, n_levels, n_space));
    Zip::from(&mut depth)
        .and_broadcast(zeta.view().insert_axis(Axis(1)))
        .and_broadcast(siglay.insert_axis(Axis(0)))
        .for_each(|d, &z, &s| *d = z * s);
    depth
}
