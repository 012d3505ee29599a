//! Vertical sections along a transect.

use std::cell::OnceCell;

use log::debug;
use ndarray::{Array1, Array2, Axis};

use super::path::{ElementGraph, Transect};
use crate::analysis::{contour_levels, time_mean, SectionPlot, DEFAULT_CONTOUR_LEVELS};
use crate::engine::{shear, DerivedFieldEngine, LevelRange};
use crate::error::{FieldError, Result};
use crate::fields::{FieldLayout, GridLocation, StateField};
use crate::spatial::SpatialLookup;

/// Time-mean field and depth along a transect, ready for a
/// distance × depth contour plot.
#[derive(Clone, Debug, PartialEq)]
pub struct TransectSection {
    pub name: String,
    pub elements: Vec<usize>,
    /// `(P)` cumulative distance (m).
    pub distance: Array1<f64>,
    /// `(L, P)` time-mean layer depth (m); mid-interval depth for
    /// `(L − 1)`-row fields such as shear.
    pub depth: Array2<f64>,
    /// `(L, P)` or `(L − 1, P)` time-mean values.
    pub values: Array2<f64>,
}

impl TransectSection {
    /// Finite min and max of the values, `None` if all are NaN.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Contour payload with 21 levels over the data range.
    pub fn to_plot(&self, title: impl Into<String>) -> SectionPlot {
        let (min, max) = self.value_range().unwrap_or((0.0, 0.0));
        self.to_plot_with_limits(title, min, max)
    }

    /// Contour payload with 21 levels between `cmin` and `cmax`.
    pub fn to_plot_with_limits(&self, title: impl Into<String>, cmin: f64, cmax: f64) -> SectionPlot {
        SectionPlot {
            distance: self.distance.clone(),
            depth: self.depth.clone(),
            values: self.values.clone(),
            levels: contour_levels(cmin, cmax, DEFAULT_CONTOUR_LEVELS),
            title: title.into(),
            x_label: "Distance along line (m)".into(),
            y_label: "Depth (m)".into(),
        }
    }
}

/// Finds paths between points and samples layered fields along them.
///
/// The element graph is built on the first [`path`](Self::path) call and
/// reused afterwards.
#[derive(Clone, Debug)]
pub struct TransectExtractor<'a> {
    engine: DerivedFieldEngine<'a>,
    lookup: SpatialLookup<'a>,
    graph: OnceCell<ElementGraph>,
}

impl<'a> TransectExtractor<'a> {
    pub fn new(engine: DerivedFieldEngine<'a>, lookup: SpatialLookup<'a>) -> Self {
        Self {
            engine,
            lookup,
            graph: OnceCell::new(),
        }
    }

    fn graph(&self) -> &ElementGraph {
        self.graph
            .get_or_init(|| ElementGraph::from_mesh(self.engine.mesh()))
    }

    /// Shortest path between the elements nearest `start` and `end`
    /// (each given as `(lon, lat)`).
    pub fn path(&self, start: (f64, f64), end: (f64, f64)) -> Result<Transect> {
        let from = self.lookup.nearest(start.0, start.1)?.get();
        let to = self.lookup.nearest(end.0, end.1)?.get();
        let transect = self.graph().shortest_path(self.engine.mesh(), from, to)?;
        debug!(
            "Transect from element {} to {}: {} elements, {:.1} m",
            from,
            to,
            transect.len(),
            transect.total_length()
        );
        Ok(transect)
    }

    /// Restrict a layered field to the transect and average over `steps`.
    ///
    /// Depth is averaged over the same steps. Static `(L, E)` fields are
    /// used as they are. Fields with one row per layer interval (`L − 1`,
    /// as `verti_shear`) get the mid-interval depth so both grids match.
    pub fn sample(&self, field: &StateField, transect: &Transect, steps: &[usize]) -> Result<TransectSection> {
        if !field.layout().has_levels() {
            return Err(FieldError::shape(
                field.name(),
                "(time, level, space) or (level, space)",
                field.layout().label(),
            ));
        }
        let mesh = self.engine.mesh();
        let n_levels = mesh.n_levels();
        let n_rows = field.n_levels().unwrap_or(0);
        let intervals = if n_rows == n_levels {
            false
        } else if n_levels > 1 && n_rows == n_levels - 1 {
            true
        } else {
            return Err(FieldError::shape(
                field.name(),
                format!("{} or {} levels", n_levels, n_levels.saturating_sub(1)),
                n_rows.to_string(),
            ));
        };
        let elements = &transect.elements;
        let on_path = match field.location() {
            GridLocation::Element => field.select_space(elements)?,
            GridLocation::Node => mesh.to_elements(field)?.select_space(elements)?,
            GridLocation::Station => {
                return Err(FieldError::shape(field.name(), "mesh field", "station field"))
            }
        };

        let values = match on_path.layout() {
            FieldLayout::TimeLevelSpace => {
                let selected = on_path.select_time(steps)?;
                selected
                    .view3()?
                    .mean_axis(Axis(0))
                    .unwrap_or_else(|| Array2::from_elem((n_rows, elements.len()), f64::NAN))
            }
            _ => on_path.view2()?.to_owned(),
        };

        let mut depth = Array2::zeros((n_rows, elements.len()));
        for (p, &e) in elements.iter().enumerate() {
            let mut column = self.engine.depth_column(e)?.select(Axis(0), steps);
            if intervals {
                column =
                    shear::interval_midpoints(column.view(), Axis(1), LevelRange::full(n_levels));
            }
            depth.column_mut(p).assign(&time_mean(&column));
        }

        Ok(TransectSection {
            name: field.name().to_string(),
            elements: elements.clone(),
            distance: Array1::from(transect.distance.clone()),
            depth,
            values,
        })
    }
}
