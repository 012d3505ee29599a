//! Tidal power kernels.

use ndarray::{Array, ArrayView, Dimension};

use crate::config::TurbineConfig;

/// `0.5 · ρ · u³` (W/m²)
pub fn power_density<D: Dimension>(speed: ArrayView<'_, f64, D>, rho: f64) -> Array<f64, D> {
    speed.mapv(|u| 0.5 * rho * u.powi(3))
}

/// Extracted power density of one turbine at flow speed `u` (W/m²),
/// before cut-in/cut-out.
#[inline]
pub fn turbine_power(turbine: &TurbineConfig, u: f64, rho: f64) -> f64 {
    let t = turbine;
    let pc = t.a4 * u.powi(4) + t.a3 * u.powi(3) + t.a2 * u.powi(2) + t.a1 * u + t.a0;
    let dcpc = t.b2 * t.tsr.powi(2) + t.b1 * t.tsr + t.b0;
    pc * dcpc * 0.5 * rho * u.powi(3)
}

/// Turbine output with cut-in/cut-out applied.
///
/// Values below the cut-in output become 0 and values above the cut-out
/// output are capped at it.
pub fn power_assessment<D: Dimension>(
    speed: ArrayView<'_, f64, D>,
    turbine: &TurbineConfig,
    rho: f64,
) -> Array<f64, D> {
    let pd_in = turbine_power(turbine, turbine.cut_in, rho);
    let pd_out = turbine_power(turbine, turbine.cut_out, rho);
    let mut pd = speed.mapv(|u| turbine_power(turbine, u, rho));
    pd.mapv_inplace(|p| clamp(p, pd_in, pd_out));
    pd
}

#[inline]
fn clamp(p: f64, pd_in: f64, pd_out: f64) -> f64 {
    let p = if p < pd_in { 0.0 } else { p };
    if p > pd_out {
        pd_out
    } else {
        p
    }
}
