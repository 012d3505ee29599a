//! Station time series and the derived quantities computed on them.

use std::fmt;

use log::{debug, warn};
use ndarray::{Array1, Array2, Array3, Axis};

use crate::analysis::{FlowDirection, ShearProfile, VelocityProfile};
use crate::engine::{depth, shear, velocity, LevelRange};
use crate::error::{FieldError, Result};
use crate::fields::{Capabilities, ComputationLogEntry, GridLocation, StateField};
use crate::mesh::Coordinates;
use crate::time::{TimeAxis, TimeSelector};
use crate::types::{GeoBounds, StationIndex};

/// A station given by position or by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StationRef {
    Index(usize),
    Name(String),
}

impl From<usize> for StationRef {
    fn from(i: usize) -> Self {
        StationRef::Index(i)
    }
}

impl From<&str> for StationRef {
    fn from(s: &str) -> Self {
        StationRef::Name(s.to_string())
    }
}

impl From<String> for StationRef {
    fn from(s: String) -> Self {
        StationRef::Name(s)
    }
}

impl fmt::Display for StationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationRef::Index(i) => write!(f, "#{}", i),
            StationRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// Model output saved at named stations.
///
/// Same variables as a mesh dataset, with the space axis running over
/// stations. Built with [`StationSeries::builder`].
#[derive(Clone, Debug)]
pub struct StationSeries {
    names: Vec<String>,
    coords: Coordinates,
    h: Array1<f64>,
    siglay: Array2<f64>,
    time: TimeAxis,
    el: Option<StateField>,
    u: Option<StateField>,
    v: Option<StateField>,
    w: Option<StateField>,
    ua: Option<StateField>,
    va: Option<StateField>,
    capabilities: Capabilities,
    history: Vec<ComputationLogEntry>,
}

impl StationSeries {
    pub fn builder() -> StationSeriesBuilder {
        StationSeriesBuilder::default()
    }

    pub fn n_stations(&self) -> usize {
        self.names.len()
    }

    pub fn n_levels(&self) -> usize {
        self.siglay.nrows()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coords
    }

    pub fn time(&self) -> &TimeAxis {
        &self.time
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Layered `u`/`v` are present.
    pub fn is_3d(&self) -> bool {
        self.capabilities.is_3d
    }

    pub fn history(&self) -> &[ComputationLogEntry] {
        &self.history
    }

    pub fn bounding_box(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(&self.coords.lon, &self.coords.lat)
    }

    /// Resolve a station by index, or by name ignoring case and surrounding
    /// blanks.
    pub fn search_index(&self, station: &StationRef) -> Result<StationIndex> {
        match station {
            StationRef::Index(i) if *i < self.n_stations() => Ok(StationIndex::new(*i)),
            StationRef::Name(name) => {
                let wanted = name.trim().to_uppercase();
                self.names
                    .iter()
                    .position(|n| n.trim().to_uppercase() == wanted)
                    .map(StationIndex::new)
                    .ok_or_else(|| FieldError::StationNotFound(station.to_string()))
            }
            StationRef::Index(_) => Err(FieldError::StationNotFound(station.to_string())),
        }
    }

    // =========================================================================
    // Columns
    // =========================================================================

    fn column2(field: &StateField, station: usize) -> Result<Array2<f64>> {
        Ok(field.view3()?.index_axis(Axis(2), station).to_owned())
    }

    fn column1(field: &StateField, station: usize) -> Result<Array1<f64>> {
        Ok(field.view2()?.column(station).to_owned())
    }

    fn require<'s>(field: &'s Option<StateField>, name: &str, required_by: &str) -> Result<&'s StateField> {
        field
            .as_ref()
            .ok_or_else(|| FieldError::missing(name, required_by))
    }

    /// `(T, L)` layer depths at a station.
    pub fn depth(&self, station: &StationRef) -> Result<Array2<f64>> {
        let s = self.search_index(station)?.get();
        let el = Self::column1(Self::require(&self.el, "el", "station depth")?, s)?;
        let h = Array1::from_elem(1, self.h[s]);
        let siglay = self.siglay.column(s);
        let depth = depth::depth_kernel(
            el.view().insert_axis(Axis(1)),
            h.view(),
            siglay.insert_axis(Axis(1)),
        );
        Ok(depth.index_axis_move(Axis(2), 0))
    }

    fn layered_speed(&self, s: usize, required_by: &str) -> Result<Array2<f64>> {
        let u = Self::column2(Self::require(&self.u, "u", required_by)?, s)?;
        let v = Self::column2(Self::require(&self.v, "v", required_by)?, s)?;
        if self.capabilities.has_vertical_velocity {
            let w = Self::column2(Self::require(&self.w, "w", required_by)?, s)?;
            Ok(velocity::speed_3d(u.view(), v.view(), w.view()))
        } else {
            warn!("{}: no vertical velocity, using horizontal norm", required_by);
            Ok(velocity::speed(u.view(), v.view()))
        }
    }

    /// `(T, L)` speed with its time-mean profile.
    pub fn velo_norm(&self, station: &StationRef, selector: &TimeSelector) -> Result<VelocityProfile> {
        let steps = self.time.resolve(selector)?;
        let s = self.search_index(station)?.get();
        let speed = self.layered_speed(s, "station velo_norm")?.select(Axis(0), &steps);
        let depth = self.depth(station)?;
        Ok(VelocityProfile::new(speed, &depth))
    }

    /// Shear between layers `levels` (whole column when `None`), `(T, n)`
    /// plus the time-mean profile.
    pub fn verti_shear(
        &self,
        station: &StationRef,
        selector: &TimeSelector,
        levels: Option<LevelRange>,
    ) -> Result<ShearProfile> {
        let n_levels = self.n_levels();
        let range = levels
            .unwrap_or_else(|| LevelRange::full(n_levels))
            .validate(n_levels)?;
        let steps = self.time.resolve(selector)?;
        let s = self.search_index(station)?.get();

        let depth = self.depth(station)?.select(Axis(0), &steps);
        let speed = self
            .layered_speed(s, "station verti_shear")?
            .select(Axis(0), &steps);
        let (values, degenerate) = shear::vertical_shear(depth.view(), speed.view(), Axis(1), range);
        if degenerate > 0 {
            warn!(
                "verti_shear at station {}: {} zero-thickness intervals set to NaN",
                station, degenerate
            );
        }
        let mid = shear::interval_midpoints(depth.view(), Axis(1), range);
        Ok(ShearProfile::new(values, &mid))
    }

    /// Direction and speed, per layer when `vertical` and layered velocity
    /// exists, depth-averaged otherwise.
    pub fn flow_dir(
        &self,
        station: &StationRef,
        selector: &TimeSelector,
        vertical: bool,
    ) -> Result<FlowDirection> {
        let steps = self.time.resolve(selector)?;
        let s = self.search_index(station)?.get();
        let (u, v) = if vertical && self.is_3d() {
            (
                Self::column2(Self::require(&self.u, "u", "station flow_dir")?, s)?,
                Self::column2(Self::require(&self.v, "v", "station flow_dir")?, s)?,
            )
        } else {
            let ua = Self::column1(Self::require(&self.ua, "ua", "station flow_dir")?, s)?;
            let va = Self::column1(Self::require(&self.va, "va", "station flow_dir")?, s)?;
            (ua.insert_axis(Axis(1)), va.insert_axis(Axis(1)))
        };
        let (u, v) = (u.select(Axis(0), &steps), v.select(Axis(0), &steps));
        Ok(FlowDirection {
            direction: velocity::direction(u.view(), v.view()),
            speed: velocity::speed(u.view(), v.view()),
        })
    }
}

/// Builder for [`StationSeries`].
#[derive(Clone, Debug, Default)]
pub struct StationSeriesBuilder {
    names: Vec<String>,
    coords: Option<Coordinates>,
    h: Option<Array1<f64>>,
    siglay: Option<Array2<f64>>,
    time: Option<TimeAxis>,
    el: Option<Array2<f64>>,
    uv: Option<(Array3<f64>, Array3<f64>)>,
    w: Option<Array3<f64>>,
    uava: Option<(Array2<f64>, Array2<f64>)>,
}

impl StationSeriesBuilder {
    /// Station names and positions.
    pub fn with_stations(mut self, names: Vec<String>, coords: Coordinates) -> Self {
        self.names = names;
        self.coords = Some(coords);
        self
    }

    /// Bathymetry `(S)` and sigma layers `(L, S)`.
    pub fn with_vertical_grid(mut self, h: Array1<f64>, siglay: Array2<f64>) -> Self {
        self.h = Some(h);
        self.siglay = Some(siglay);
        self
    }

    pub fn with_time(mut self, time: TimeAxis) -> Self {
        self.time = Some(time);
        self
    }

    /// Elevation `(T, S)`.
    pub fn with_elevation(mut self, el: Array2<f64>) -> Self {
        self.el = Some(el);
        self
    }

    /// Layered velocity `(T, L, S)`.
    pub fn with_velocity(mut self, u: Array3<f64>, v: Array3<f64>) -> Self {
        self.uv = Some((u, v));
        self
    }

    pub fn with_vertical_velocity(mut self, w: Array3<f64>) -> Self {
        self.w = Some(w);
        self
    }

    /// Depth-averaged velocity `(T, S)`.
    pub fn with_depth_averaged_velocity(mut self, ua: Array2<f64>, va: Array2<f64>) -> Self {
        self.uava = Some((ua, va));
        self
    }

    pub fn build(self) -> Result<StationSeries> {
        let coords = self
            .coords
            .ok_or_else(|| FieldError::missing("lon/lat", "station output"))?;
        let n = self.names.len();
        if coords.len() != n {
            return Err(FieldError::shape(
                "station coordinates",
                format!("{} stations", n),
                coords.len().to_string(),
            ));
        }
        let h = self.h.ok_or_else(|| FieldError::missing("h", "station output"))?;
        let siglay = self
            .siglay
            .ok_or_else(|| FieldError::missing("siglay", "station output"))?;
        let time = self
            .time
            .ok_or_else(|| FieldError::missing("time", "station output"))?;
        let n_levels = siglay.nrows();
        let n_time = time.len();

        check_shape("h", h.shape(), &[n])?;
        check_shape("siglay", siglay.shape(), &[n_levels, n])?;

        let series_2d = |name: &str, values: Array2<f64>| -> Result<StateField> {
            check_shape(name, values.shape(), &[n_time, n])?;
            Ok(StateField::time_space(name, values, GridLocation::Station))
        };
        let series_3d = |name: &str, values: Array3<f64>| -> Result<StateField> {
            check_shape(name, values.shape(), &[n_time, n_levels, n])?;
            Ok(StateField::time_level_space(name, values, GridLocation::Station))
        };

        let el = self.el.map(|el| series_2d("el", el)).transpose()?;
        let (u, v) = match self.uv {
            Some((u, v)) => (Some(series_3d("u", u)?), Some(series_3d("v", v)?)),
            None => (None, None),
        };
        let w = self.w.map(|w| series_3d("w", w)).transpose()?;
        let (ua, va) = match self.uava {
            Some((ua, va)) => (Some(series_2d("ua", ua)?), Some(series_2d("va", va)?)),
            None => (None, None),
        };
        if w.is_some() && u.is_none() {
            return Err(FieldError::missing("u", "vertical velocity"));
        }

        let capabilities = Capabilities {
            is_3d: u.is_some(),
            has_vertical_velocity: w.is_some(),
            has_depth_averaged: ua.is_some(),
        };
        let mut series = StationSeries {
            names: self.names,
            coords,
            h,
            siglay,
            time,
            el,
            u,
            v,
            w,
            ua,
            va,
            capabilities,
            history: Vec::new(),
        };
        if let Some(bounds) = series.bounding_box() {
            series
                .history
                .push(ComputationLogEntry::new("grid", format!("Bounding box = {}", bounds)));
        }
        debug!(
            "Station series: {} stations, {} levels, {} time steps",
            n, n_levels, n_time
        );
        Ok(series)
    }
}

fn check_shape(name: &str, actual: &[usize], expected: &[usize]) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(FieldError::shape(
            name,
            format!("{:?}", expected),
            format!("{:?}", actual),
        ))
    }
}
