//! Derived-field formulas.
//!
//! Kernels in the submodules operate on plain `ndarray` views. The
//! [`DerivedFieldEngine`] feeds them either the whole mesh or a single
//! element column; both paths run the same arithmetic, so a point query and
//! the matching slice of the full-domain field agree exactly.
//!
//! Horizontal velocity is always handled as a `(T, L, E)` view. Depth-averaged
//! pairs are viewed as `(T, 1, E)` and squeezed back on output.

pub mod depth;
pub mod memory;
pub mod power;
pub mod shear;
pub mod velocity;
pub mod vorticity;

use std::time::Instant;

use log::{debug, warn};
use ndarray::{Array1, Array2, Array3, ArrayD, ArrayView2, ArrayView3, Axis, Ix1, Ix2};

use crate::config::EngineConfig;
use crate::error::{FieldError, Result};
use crate::fields::{Capabilities, FieldLayout, GridLocation, RawFields, StateField};
use crate::mesh::MeshIndex;

pub use memory::MemoryGuard;
pub use shear::LevelRange;
pub use vorticity::NeighborColumns;

/// A pair of horizontal velocity components viewed as `(T, L, E)`.
#[derive(Clone, Copy, Debug)]
pub struct VelocityPair<'a> {
    pub u: ArrayView3<'a, f64>,
    pub v: ArrayView3<'a, f64>,
    /// Layout of the source fields (`TimeLevelSpace` or `TimeSpace`).
    pub layout: FieldLayout,
}

impl<'a> VelocityPair<'a> {
    /// `(T, L)` columns at one element.
    pub fn columns(&self, element: usize) -> (Array2<f64>, Array2<f64>) {
        (
            self.u.index_axis(Axis(2), element).to_owned(),
            self.v.index_axis(Axis(2), element).to_owned(),
        )
    }
}

/// Computes derived fields from a dataset's mesh and raw variables.
///
/// Stateless: caching lives in [`FieldCache`](crate::fields::FieldCache).
#[derive(Clone, Copy, Debug)]
pub struct DerivedFieldEngine<'a> {
    mesh: &'a MeshIndex,
    raw: &'a RawFields,
    capabilities: Capabilities,
    config: &'a EngineConfig,
}

impl<'a> DerivedFieldEngine<'a> {
    pub fn new(
        mesh: &'a MeshIndex,
        raw: &'a RawFields,
        capabilities: Capabilities,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            mesh,
            raw,
            capabilities,
            config,
        }
    }

    pub fn mesh(&self) -> &'a MeshIndex {
        self.mesh
    }

    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn guard(&self) -> MemoryGuard {
        MemoryGuard::new(self.config.memory_limit_bytes)
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    fn elevation(&self, required_by: &str) -> Result<&'a StateField> {
        self.raw
            .el()
            .ok_or_else(|| FieldError::missing("el", required_by))
    }

    /// Layered `(u, v)` when `layered` and the dataset is 3D, else `(ua, va)`.
    pub fn velocity_pair(&self, layered: bool, required_by: &str) -> Result<VelocityPair<'a>> {
        if layered && self.capabilities.is_3d {
            let u = self.raw.u().ok_or_else(|| FieldError::missing("u", required_by))?;
            let v = self.raw.v().ok_or_else(|| FieldError::missing("v", required_by))?;
            return Ok(VelocityPair {
                u: u.view3()?,
                v: v.view3()?,
                layout: FieldLayout::TimeLevelSpace,
            });
        }
        if !self.capabilities.has_depth_averaged {
            return Err(FieldError::missing("ua", required_by));
        }
        let ua = self.raw.ua().ok_or_else(|| FieldError::missing("ua", required_by))?;
        let va = self.raw.va().ok_or_else(|| FieldError::missing("va", required_by))?;
        Ok(VelocityPair {
            u: ua.view2()?.insert_axis(Axis(1)),
            v: va.view2()?.insert_axis(Axis(1)),
            layout: FieldLayout::TimeSpace,
        })
    }

    fn vertical_velocity(&self, pair: &VelocityPair<'a>) -> Result<Option<ArrayView3<'a, f64>>> {
        if pair.layout != FieldLayout::TimeLevelSpace || !self.capabilities.has_vertical_velocity {
            return Ok(None);
        }
        let w = self
            .raw
            .w()
            .ok_or_else(|| FieldError::missing("w", "vertical velocity"))?;
        Ok(Some(w.view3()?))
    }

    fn n_time(&self) -> Result<usize> {
        let el = self.raw.el().or(self.raw.u()).or(self.raw.ua());
        el.and_then(StateField::n_time)
            .ok_or_else(|| FieldError::missing("el", "time dimension"))
    }

    // =========================================================================
    // Depth
    // =========================================================================

    /// `(T, L, E)` layer depths.
    pub fn depth(&self) -> Result<StateField> {
        let start = Instant::now();
        let el = self.elevation("depth")?;
        let n_values = self.n_time()? * self.mesh.n_levels() * self.mesh.n_elements();
        self.guard().check("depth", n_values, 1)?;

        let el_e = self.mesh.to_elements(el)?;
        let h_e = self.mesh.h_elements()?;
        let siglay_e = self.mesh.siglay_elements()?;
        let depth = depth::depth_kernel(el_e.view2()?, h_e.view(), siglay_e.view());

        debug!("depth computed in {:?}", start.elapsed());
        Ok(StateField::time_level_space("depth", depth, GridLocation::Element))
    }

    /// `(T, L)` layer depths at one element.
    pub fn depth_column(&self, element: usize) -> Result<Array2<f64>> {
        let el = self.mesh.column_at_element(self.elevation("depth")?, element)?;
        let el = el
            .into_dimensionality::<Ix1>()
            .map_err(|_| FieldError::shape("el", "(time, space)", "other"))?;
        let h = Array1::from_elem(1, self.mesh.h_at_element(element)?);
        let siglay = self.mesh.siglay_at_element(element)?;

        let depth = depth::depth_kernel(
            el.view().insert_axis(Axis(1)),
            h.view(),
            siglay.view().insert_axis(Axis(1)),
        );
        Ok(depth.index_axis_move(Axis(2), 0))
    }

    // =========================================================================
    // Speed and direction
    // =========================================================================

    fn norm(&self, include_w: bool, name: &str) -> Result<StateField> {
        let start = Instant::now();
        let pair = self.velocity_pair(true, name)?;
        if include_w && pair.layout == FieldLayout::TimeSpace {
            warn!("{}: no layered velocity, using depth-averaged ua/va", name);
        }
        let w = if include_w {
            let w = self.vertical_velocity(&pair)?;
            if w.is_none() && pair.layout == FieldLayout::TimeLevelSpace {
                warn!("{}: no vertical velocity, using horizontal norm", name);
            }
            w
        } else {
            None
        };

        let arrays = if w.is_some() { 4 } else { 3 };
        self.guard().check(name, pair.u.len(), arrays)?;

        let values = match w {
            Some(w) => velocity::speed_3d(pair.u, pair.v, w),
            None => velocity::speed(pair.u, pair.v),
        };
        debug!("{} computed in {:?}", name, start.elapsed());
        Ok(squeeze(name, values, pair.layout))
    }

    /// `sqrt(u² + v² + w²)`, dropping `w` when it is absent.
    pub fn velo_norm(&self) -> Result<StateField> {
        self.norm(true, "velo_norm")
    }

    /// `sqrt(u² + v²)`: layered when the dataset is 3D, depth-averaged
    /// otherwise.
    pub fn hori_velo_norm(&self) -> Result<StateField> {
        self.norm(false, "hori_velo_norm")
    }

    /// `(T, L)` speed at one element, `(T, 1)` for depth-averaged data.
    pub fn norm_column(&self, element: usize, include_w: bool) -> Result<Array2<f64>> {
        let name = if include_w { "velo_norm" } else { "hori_velo_norm" };
        let pair = self.velocity_pair(true, name)?;
        let (u, v) = pair.columns(element);
        let w = if include_w {
            self.vertical_velocity(&pair)?
                .map(|w| w.index_axis(Axis(2), element).to_owned())
        } else {
            None
        };
        Ok(match w {
            Some(w) => velocity::speed_3d(u.view(), v.view(), w.view()),
            None => velocity::speed(u.view(), v.view()),
        })
    }

    /// Flow direction in degrees; per layer when `vertical` and 3D.
    pub fn flow_dir(&self, vertical: bool) -> Result<StateField> {
        let pair = self.velocity_pair(vertical, "flow_dir")?;
        self.guard().check("flow_dir", pair.u.len(), 3)?;
        let values = velocity::direction(pair.u, pair.v);
        Ok(squeeze("flow_dir", values, pair.layout))
    }

    // =========================================================================
    // Vertical shear
    // =========================================================================

    /// Shear of `speed` against `depth` (both `(T, L, E)`) over `range`.
    pub fn verti_shear(
        &self,
        depth: &StateField,
        speed: &StateField,
        range: LevelRange,
    ) -> Result<StateField> {
        if !self.capabilities.is_3d {
            return Err(FieldError::missing("u", "verti_shear"));
        }
        let range = range.validate(self.mesh.n_levels())?;
        let depth = depth.view3()?;
        let speed = speed.view3()?;
        let n_values = depth.len() / self.mesh.n_levels().max(1) * range.n_intervals();
        self.guard().check("verti_shear", n_values, 1)?;

        let (shear, degenerate) = shear::vertical_shear(depth, speed, Axis(1), range);
        if degenerate > 0 {
            warn!(
                "verti_shear: {} zero-thickness layer intervals set to NaN",
                degenerate
            );
        }
        Ok(StateField::time_level_space(
            "verti_shear",
            shear,
            GridLocation::Element,
        ))
    }

    // =========================================================================
    // Vorticity
    // =========================================================================

    /// `(steps, L, E)` vorticity at the given time steps; `L = 1` for
    /// depth-averaged data.
    pub fn vorticity(&self, steps: &[usize]) -> Result<Array3<f64>> {
        let start = Instant::now();
        let a1u = self.mesh.a1u()?;
        let a2u = self.mesh.a2u()?;
        let pair = self.velocity_pair(true, "vorticity")?;
        let (n_time, n_levels, n_elements) = pair.u.dim();
        check_steps(steps, n_time)?;
        self.guard()
            .check("vorticity", steps.len() * n_levels * n_elements, 4)?;

        let neighbors = NeighborColumns::from_mesh(self.mesh);

        #[cfg(feature = "parallel")]
        let vort =
            vorticity::vorticity_series_parallel(pair.u, pair.v, a1u, a2u, &neighbors, steps);
        #[cfg(not(feature = "parallel"))]
        let vort = vorticity::vorticity_series(pair.u, pair.v, a1u, a2u, &neighbors, steps);

        debug!(
            "vorticity over {} steps computed in {:?}",
            steps.len(),
            start.elapsed()
        );
        Ok(vort)
    }

    /// [`vorticity`](Self::vorticity) wrapped as an element field.
    pub fn vorticity_field(&self, steps: &[usize]) -> Result<StateField> {
        let values = self.vorticity(steps)?;
        let layout = if self.capabilities.is_3d {
            FieldLayout::TimeLevelSpace
        } else {
            FieldLayout::TimeSpace
        };
        Ok(squeeze("vorticity", values, layout))
    }

    /// `(steps, L)` vorticity at one element.
    pub fn vorticity_column(&self, element: usize, steps: &[usize]) -> Result<Array2<f64>> {
        let a1u = self.mesh.a1u()?;
        let a2u = self.mesh.a2u()?;
        let pair = self.velocity_pair(true, "vorticity")?;
        let (n_time, n_levels, _) = pair.u.dim();
        check_steps(steps, n_time)?;

        let u = pair.u.select(Axis(0), steps);
        let v = pair.v.select(Axis(0), steps);
        let column = |field: &Array3<f64>, slot: usize| -> Array2<f64> {
            if self.mesh.is_ghost(slot) {
                Array2::zeros((steps.len(), n_levels))
            } else {
                field.index_axis(Axis(2), slot).to_owned()
            }
        };
        let [n1, n2, n3] = self.mesh.neighbors(element);
        let slots = [element, n1, n2, n3];
        let v_cols = slots.map(|s| column(&v, s));
        let u_cols = slots.map(|s| column(&u, s));
        let dvdx = vorticity::reconstruct_columns(&v_cols, weights_at(a1u, element));
        let dudy = vorticity::reconstruct_columns(&u_cols, weights_at(a2u, element));
        Ok(dvdx - dudy)
    }

    // =========================================================================
    // Power
    // =========================================================================

    pub fn power_density(&self, speed: &StateField) -> Result<StateField> {
        self.guard().check("power_density", speed.len(), 2)?;
        let values = power::power_density(speed.values().view(), self.config.rho_seawater);
        StateField::new("power_density", values, speed.layout(), speed.location())
    }

    pub fn power_assessment(&self, speed: &StateField) -> Result<StateField> {
        self.config.turbine.validate()?;
        self.guard().check("power_assessment", speed.len(), 2)?;
        let values = power::power_assessment(
            speed.values().view(),
            &self.config.turbine,
            self.config.rho_seawater,
        );
        StateField::new("power_assessment", values, speed.layout(), speed.location())
    }
}

/// Wrap a `(T, L, E)` result, dropping the unit level axis of depth-averaged
/// input.
fn squeeze(name: &str, values: Array3<f64>, layout: FieldLayout) -> StateField {
    match layout {
        FieldLayout::TimeSpace => {
            StateField::time_space(name, values.index_axis_move(Axis(1), 0), GridLocation::Element)
        }
        _ => StateField::time_level_space(name, values, GridLocation::Element),
    }
}

fn weights_at(coeff: ArrayView2<'_, f64>, element: usize) -> [f64; 4] {
    [
        coeff[[0, element]],
        coeff[[1, element]],
        coeff[[2, element]],
        coeff[[3, element]],
    ]
}

fn check_steps(steps: &[usize], n_time: usize) -> Result<()> {
    match steps.iter().find(|&&t| t >= n_time) {
        Some(&bad) => Err(FieldError::shape(
            "time index",
            format!("< {}", n_time),
            bad.to_string(),
        )),
        None => Ok(()),
    }
}

/// View a point result as `(T, L)`.
pub(crate) fn as_column(values: ArrayD<f64>, name: &str) -> Result<Array2<f64>> {
    match values.ndim() {
        1 => {
            let n = values.len();
            values
                .into_shape_with_order((n, 1))
                .map_err(|_| FieldError::shape(name, "(time)", "other"))
        }
        _ => values
            .into_dimensionality::<Ix2>()
            .map_err(|_| FieldError::shape(name, "(time, level)", "other")),
    }
}
