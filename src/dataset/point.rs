//! Single-location variants of the derived fields.
//!
//! Every query resolves the nearest element (or takes a known one), then
//! either slices the cached domain field or runs the same kernel on that
//! element's column alone. Results are `(T, L)`, with `L = 1` for
//! depth-averaged quantities.

use log::warn;
use ndarray::{Array2, Axis, Slice};

use super::FvcomDataset;
use crate::analysis::{FlowDirection, ShearProfile};
use crate::engine::{as_column, power, shear, velocity, LevelRange};
use crate::error::{FieldError, Result};
use crate::fields::DerivedKind;
use crate::time::TimeSelector;
use crate::types::ElementIndex;

impl FvcomDataset {
    fn locate(&self, lon: f64, lat: f64, index: Option<ElementIndex>) -> Result<usize> {
        Ok(self.lookup().resolve(lon, lat, index)?.get())
    }

    /// Column of a cached domain field, if present.
    fn cached_column(&self, kind: DerivedKind, element: usize) -> Result<Option<Array2<f64>>> {
        match self.cache.get(kind) {
            Some(field) => Ok(Some(as_column(field.at_space(element)?, kind.name())?)),
            None => Ok(None),
        }
    }

    fn speed_column(&self, element: usize, include_w: bool) -> Result<Array2<f64>> {
        let kind = if include_w {
            DerivedKind::VeloNorm
        } else {
            DerivedKind::HoriVeloNorm
        };
        match self.cached_column(kind, element)? {
            Some(column) => Ok(column),
            None => self.engine().norm_column(element, include_w),
        }
    }

    fn depth_column(&self, element: usize) -> Result<Array2<f64>> {
        match self.cached_column(DerivedKind::Depth, element)? {
            Some(column) => Ok(column),
            None => self.engine().depth_column(element),
        }
    }

    /// `(T, L)` layer depths at the element nearest `(lon, lat)`.
    pub fn depth_at_point(&self, lon: f64, lat: f64, index: Option<ElementIndex>) -> Result<Array2<f64>> {
        let element = self.locate(lon, lat, index)?;
        self.depth_column(element)
    }

    pub fn velo_norm_at_point(
        &self,
        lon: f64,
        lat: f64,
        selector: &TimeSelector,
        index: Option<ElementIndex>,
    ) -> Result<Array2<f64>> {
        let steps = self.time.resolve(selector)?;
        let element = self.locate(lon, lat, index)?;
        Ok(self.speed_column(element, true)?.select(Axis(0), &steps))
    }

    pub fn hori_velo_norm_at_point(
        &self,
        lon: f64,
        lat: f64,
        selector: &TimeSelector,
        index: Option<ElementIndex>,
    ) -> Result<Array2<f64>> {
        let steps = self.time.resolve(selector)?;
        let element = self.locate(lon, lat, index)?;
        Ok(self.speed_column(element, false)?.select(Axis(0), &steps))
    }

    /// Shear profile between layers `levels` (the whole column when `None`).
    ///
    /// Shear and mid-interval depth are time-averaged for the profile.
    pub fn verti_shear_at_point(
        &self,
        lon: f64,
        lat: f64,
        selector: &TimeSelector,
        levels: Option<LevelRange>,
        index: Option<ElementIndex>,
    ) -> Result<ShearProfile> {
        if !self.capabilities.is_3d {
            return Err(FieldError::missing("u", "verti_shear"));
        }
        let n_levels = self.mesh.n_levels();
        let range = levels
            .unwrap_or_else(|| LevelRange::full(n_levels))
            .validate(n_levels)?;
        let steps = self.time.resolve(selector)?;
        let element = self.locate(lon, lat, index)?;

        let depth = self.depth_column(element)?.select(Axis(0), &steps);
        let values = match self.cached_column(DerivedKind::VertiShear, element)? {
            Some(full) => full
                .slice_axis(Axis(1), Slice::from(range.bot..range.top))
                .select(Axis(0), &steps),
            None => {
                let speed = self.speed_column(element, true)?.select(Axis(0), &steps);
                let (values, degenerate) =
                    shear::vertical_shear(depth.view(), speed.view(), Axis(1), range);
                if degenerate > 0 {
                    warn!(
                        "verti_shear at element {}: {} zero-thickness intervals set to NaN",
                        element,
                        degenerate
                    );
                }
                values
            }
        };
        let mid = shear::interval_midpoints(depth.view(), Axis(1), range);
        Ok(ShearProfile::new(values, &mid))
    }

    /// Direction and speed of the same velocity pair: per layer when
    /// `vertical` and the dataset is 3D, depth-averaged otherwise.
    pub fn flow_dir_at_point(
        &self,
        lon: f64,
        lat: f64,
        selector: &TimeSelector,
        vertical: bool,
        index: Option<ElementIndex>,
    ) -> Result<FlowDirection> {
        let steps = self.time.resolve(selector)?;
        let element = self.locate(lon, lat, index)?;
        let engine = self.engine();
        let pair = engine.velocity_pair(vertical, "flow_dir")?;
        let (u, v) = pair.columns(element);
        let (u, v) = (u.select(Axis(0), &steps), v.select(Axis(0), &steps));

        let layered_request = vertical || !self.capabilities.is_3d;
        let direction = match self.cached_column(DerivedKind::FlowDir, element)? {
            Some(full) if layered_request => full.select(Axis(0), &steps),
            _ => velocity::direction(u.view(), v.view()),
        };
        let speed = velocity::speed(u.view(), v.view());
        Ok(FlowDirection { direction, speed })
    }

    /// `(T, L)` vorticity at one element for the selected steps.
    pub fn vorticity_at_point(
        &self,
        lon: f64,
        lat: f64,
        selector: &TimeSelector,
        index: Option<ElementIndex>,
    ) -> Result<Array2<f64>> {
        let steps = self.time.resolve(selector)?;
        let element = self.locate(lon, lat, index)?;
        match self.cached_column(DerivedKind::Vorticity, element)? {
            Some(full) => Ok(full.select(Axis(0), &steps)),
            None => self.engine().vorticity_column(element, &steps),
        }
    }

    pub fn power_density_at_point(
        &self,
        lon: f64,
        lat: f64,
        selector: &TimeSelector,
        index: Option<ElementIndex>,
    ) -> Result<Array2<f64>> {
        let steps = self.time.resolve(selector)?;
        let element = self.locate(lon, lat, index)?;
        let values = match self.cached_column(DerivedKind::PowerDensity, element)? {
            Some(full) => full,
            None => {
                let speed = self.speed_column(element, true)?;
                power::power_density(speed.view(), self.config.rho_seawater)
            }
        };
        Ok(values.select(Axis(0), &steps))
    }

    pub fn power_assessment_at_point(
        &self,
        lon: f64,
        lat: f64,
        selector: &TimeSelector,
        index: Option<ElementIndex>,
    ) -> Result<Array2<f64>> {
        let steps = self.time.resolve(selector)?;
        let element = self.locate(lon, lat, index)?;
        let values = match self.cached_column(DerivedKind::PowerAssessment, element)? {
            Some(full) => full,
            None => {
                self.config.turbine.validate()?;
                let speed = self.speed_column(element, true)?;
                power::power_assessment(speed.view(), &self.config.turbine, self.config.rho_seawater)
            }
        };
        Ok(values.select(Axis(0), &steps))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::dataset;
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::s;

    #[test]
    fn test_point_matches_domain() {
        let mut data = dataset();
        let at = Some(ElementIndex::new(1));
        let all = TimeSelector::All;

        let point = data.velo_norm_at_point(0.0, 0.0, &all, at).unwrap();
        let domain = data.velo_norm().unwrap();
        let slice = domain.view3().unwrap().slice(s![.., .., 1]).to_owned();
        assert_eq!(point, slice);

        let depth = data.depth_at_point(0.0, 0.0, at).unwrap();
        let domain = data.depth().unwrap();
        assert_eq!(depth, domain.view3().unwrap().slice(s![.., .., 1]).to_owned());
    }

    #[test]
    fn test_shear_profile_at_point() {
        let data = dataset();
        let profile = data
            .verti_shear_at_point(0.2, 0.2, &TimeSelector::range(0, 2), None, None)
            .unwrap();
        assert_eq!(profile.shear.dim(), (2, 1));
        assert_relative_eq!(profile.mean_shear[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(profile.mean_depth[0], -5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cached_shear_sliced() {
        let mut data = dataset();
        let fresh = data
            .verti_shear_at_point(0.2, 0.2, &TimeSelector::All, None, None)
            .unwrap();
        data.verti_shear().unwrap();
        let cached = data
            .verti_shear_at_point(0.2, 0.2, &TimeSelector::All, None, None)
            .unwrap();
        assert_eq!(fresh, cached);
    }

    #[test]
    fn test_flow_dir_east() {
        let data = dataset();
        let flow = data
            .flow_dir_at_point(0.2, 0.2, &TimeSelector::Indices(vec![2]), true, None)
            .unwrap();
        assert_eq!(flow.direction.dim(), (1, 2));
        assert_eq!(flow.direction[[0, 0]], 0.0);
        assert_relative_eq!(flow.speed[[0, 0]], 3.0);
    }

    #[test]
    fn test_out_of_range_index() {
        let data = dataset();
        let err = data
            .depth_at_point(0.0, 0.0, Some(ElementIndex::new(7)))
            .unwrap_err();
        assert!(matches!(err, FieldError::ShapeMismatch { .. }));
    }
}
