//! Full-domain derived fields, cached on first request.

use std::sync::Arc;

use ndarray::{Axis, Slice};

use super::FvcomDataset;
use crate::engine::LevelRange;
use crate::error::{FieldError, Result};
use crate::fields::{DerivedKind, StateField};
use crate::time::TimeSelector;

impl FvcomDataset {
    /// `(T, L, E)` layer depths (m), 0 at the free surface.
    pub fn depth(&mut self) -> Result<Arc<StateField>> {
        let (engine, cache) = self.split();
        cache.get_or_compute(DerivedKind::Depth, || engine.depth())
    }

    /// Current speed including `w` when present.
    pub fn velo_norm(&mut self) -> Result<Arc<StateField>> {
        let (engine, cache) = self.split();
        cache.get_or_compute(DerivedKind::VeloNorm, || engine.velo_norm())
    }

    pub fn hori_velo_norm(&mut self) -> Result<Arc<StateField>> {
        let (engine, cache) = self.split();
        cache.get_or_compute(DerivedKind::HoriVeloNorm, || engine.hori_velo_norm())
    }

    /// `(T, L−1, E)` vertical shear over the whole column.
    ///
    /// Pulls `depth` and `velo_norm` into the cache first.
    pub fn verti_shear(&mut self) -> Result<Arc<StateField>> {
        if let Some(shear) = self.cache.get(DerivedKind::VertiShear) {
            return Ok(shear);
        }
        if !self.capabilities.is_3d {
            return Err(FieldError::missing("u", "verti_shear"));
        }
        let depth = self.depth()?;
        let speed = self.velo_norm()?;
        let range = LevelRange::full(self.mesh.n_levels());

        let (engine, cache) = self.split();
        cache.get_or_compute(DerivedKind::VertiShear, || {
            engine.verti_shear(&depth, &speed, range)
        })
    }

    /// Shear restricted to the layers `[range.bot, range.top]`.
    ///
    /// Sliced from the cached full-column field.
    pub fn verti_shear_levels(&mut self, range: LevelRange) -> Result<StateField> {
        let range = range.validate(self.mesh.n_levels())?;
        let full = self.verti_shear()?;
        if range.is_full(self.mesh.n_levels()) {
            return Ok(full.as_ref().clone());
        }
        let values = full
            .view3()?
            .slice_axis(Axis(1), Slice::from(range.bot..range.top))
            .to_owned();
        StateField::new(
            "verti_shear",
            values.into_dyn(),
            full.layout(),
            full.location(),
        )
    }

    /// Per-layer flow direction (degrees) for 3D datasets, depth-averaged
    /// otherwise.
    pub fn flow_dir(&mut self) -> Result<Arc<StateField>> {
        let (engine, cache) = self.split();
        cache.get_or_compute(DerivedKind::FlowDir, || engine.flow_dir(true))
    }

    /// Depth-averaged flow direction even when layered velocity exists.
    ///
    /// Not cached.
    pub fn flow_dir_depth_averaged(&self) -> Result<StateField> {
        self.engine().flow_dir(false)
    }

    /// Vorticity (1/s) at every time step.
    pub fn vorticity(&mut self) -> Result<Arc<StateField>> {
        let steps: Vec<usize> = (0..self.time.len()).collect();
        let (engine, cache) = self.split();
        cache.get_or_compute(DerivedKind::Vorticity, || engine.vorticity_field(&steps))
    }

    /// Vorticity over a time range.
    ///
    /// Sliced from the cache when the full field exists; otherwise only the
    /// selected steps are computed and nothing is stored.
    pub fn vorticity_over_period(&self, selector: &TimeSelector) -> Result<StateField> {
        let steps = self.time.resolve(selector)?;
        match self.cache.get(DerivedKind::Vorticity) {
            Some(vort) => vort.select_time(&steps),
            None => self.engine().vorticity_field(&steps),
        }
    }

    /// `0.5 ρ u³` from `velo_norm` (W/m²).
    pub fn power_density(&mut self) -> Result<Arc<StateField>> {
        if let Some(pd) = self.cache.get(DerivedKind::PowerDensity) {
            return Ok(pd);
        }
        let speed = self.velo_norm()?;
        let (engine, cache) = self.split();
        cache.get_or_compute(DerivedKind::PowerDensity, || engine.power_density(&speed))
    }

    /// Turbine output with the configured power curve and cut-in/cut-out.
    pub fn power_assessment(&mut self) -> Result<Arc<StateField>> {
        if let Some(pd) = self.cache.get(DerivedKind::PowerAssessment) {
            return Ok(pd);
        }
        let speed = self.velo_norm()?;
        let (engine, cache) = self.split();
        cache.get_or_compute(DerivedKind::PowerAssessment, || {
            engine.power_assessment(&speed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::dataset;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compute_once() {
        let mut data = dataset();
        let a = data.velo_norm().unwrap();
        let b = data.velo_norm().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let entries: Vec<_> = data
            .log()
            .iter()
            .filter(|e| e.field_name == "velo_norm")
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_shear_pulls_dependencies() {
        let mut data = dataset();
        let shear = data.verti_shear().unwrap();
        assert_eq!(shear.shape(), &[3, 1, 2]);
        assert_relative_eq!(shear.values()[[0, 0, 0]], 0.1, epsilon = 1e-12);

        let names: Vec<_> = data.log().iter().map(|e| e.field_name.as_str()).collect();
        assert_eq!(names, vec!["grid", "depth", "velo_norm", "verti_shear"]);
    }

    #[test]
    fn test_shear_levels_validated() {
        let mut data = dataset();
        assert!(matches!(
            data.verti_shear_levels(LevelRange::new(1, 1)),
            Err(FieldError::InvalidLevelRange { .. })
        ));
        let full = data.verti_shear_levels(LevelRange::full(2)).unwrap();
        assert_eq!(full.shape(), &[3, 1, 2]);
    }

    #[test]
    fn test_power_density_uses_velo_norm() {
        let mut data = dataset();
        let pd = data.power_density().unwrap();
        // t = 1, surface: u = 2
        assert_relative_eq!(pd.values()[[1, 0, 0]], 0.5 * 1025.0 * 8.0);
        assert!(data.cache().contains(DerivedKind::VeloNorm));
    }

    #[test]
    fn test_failed_vorticity_stores_nothing() {
        // the test mesh carries no a1u/a2u
        let mut data = dataset();
        let before = data.log().len();
        assert!(matches!(
            data.vorticity(),
            Err(FieldError::MissingField { .. })
        ));
        assert_eq!(data.log().len(), before);
        assert!(!data.cache().contains(DerivedKind::Vorticity));
    }
}
