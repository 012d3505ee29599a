//! Named, shape-tagged model arrays.
//!
//! A [`StateField`] wraps an `ndarray::ArrayD<f64>` together with an explicit
//! [`FieldLayout`] (which axes are time / level / space) and the
//! [`GridLocation`] of its horizontal axis. The horizontal axis is always the
//! last one, so slicing a single element or station is the same operation for
//! every layout.

use ndarray::{Array1, Array2, Array3, ArrayD, ArrayView1, ArrayView2, ArrayView3, Axis, IxDyn};

use crate::error::{FieldError, Result};

/// Where the horizontal axis of a field lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridLocation {
    /// Triangle vertices (elevation, bathymetry on most grids).
    Node,
    /// Element centroids (velocities, derived fields).
    Element,
    /// Points of a station-output file.
    Station,
}

/// Axis arrangement of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldLayout {
    /// `(space)`: static 2D grid values such as `h`.
    Space,
    /// `(level, space)`: static vertical grid such as `siglay`.
    LevelSpace,
    /// `(time, space)`: depth-averaged or surface fields.
    TimeSpace,
    /// `(time, level, space)`: layered 3D fields.
    TimeLevelSpace,
}

impl FieldLayout {
    /// Number of array dimensions for this layout.
    pub fn ndim(self) -> usize {
        match self {
            FieldLayout::Space => 1,
            FieldLayout::LevelSpace | FieldLayout::TimeSpace => 2,
            FieldLayout::TimeLevelSpace => 3,
        }
    }

    pub fn has_time(self) -> bool {
        matches!(self, FieldLayout::TimeSpace | FieldLayout::TimeLevelSpace)
    }

    pub fn has_levels(self) -> bool {
        matches!(self, FieldLayout::LevelSpace | FieldLayout::TimeLevelSpace)
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldLayout::Space => "(space)",
            FieldLayout::LevelSpace => "(level, space)",
            FieldLayout::TimeSpace => "(time, space)",
            FieldLayout::TimeLevelSpace => "(time, level, space)",
        }
    }
}

/// A named model array with explicit layout and grid location.
#[derive(Clone, Debug, PartialEq)]
pub struct StateField {
    name: String,
    values: ArrayD<f64>,
    layout: FieldLayout,
    location: GridLocation,
}

impl StateField {
    /// Wrap an arbitrary-rank array, checking its rank against `layout`.
    pub fn new(
        name: impl Into<String>,
        values: ArrayD<f64>,
        layout: FieldLayout,
        location: GridLocation,
    ) -> Result<Self> {
        let name = name.into();
        if values.ndim() != layout.ndim() {
            return Err(FieldError::shape(
                name,
                layout.label(),
                format!("{:?}", values.shape()),
            ));
        }
        Ok(Self {
            name,
            values,
            layout,
            location,
        })
    }

    /// `(time, level, space)` field.
    pub fn time_level_space(
        name: impl Into<String>,
        values: Array3<f64>,
        location: GridLocation,
    ) -> Self {
        Self {
            name: name.into(),
            values: values.into_dyn(),
            layout: FieldLayout::TimeLevelSpace,
            location,
        }
    }

    /// `(time, space)` field.
    pub fn time_space(name: impl Into<String>, values: Array2<f64>, location: GridLocation) -> Self {
        Self {
            name: name.into(),
            values: values.into_dyn(),
            layout: FieldLayout::TimeSpace,
            location,
        }
    }

    /// `(level, space)` field.
    pub fn level_space(
        name: impl Into<String>,
        values: Array2<f64>,
        location: GridLocation,
    ) -> Self {
        Self {
            name: name.into(),
            values: values.into_dyn(),
            layout: FieldLayout::LevelSpace,
            location,
        }
    }

    /// `(space)` field.
    pub fn space(name: impl Into<String>, values: Array1<f64>, location: GridLocation) -> Self {
        Self {
            name: name.into(),
            values: values.into_dyn(),
            layout: FieldLayout::Space,
            location,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    #[inline]
    pub fn layout(&self) -> FieldLayout {
        self.layout
    }

    #[inline]
    pub fn location(&self) -> GridLocation {
        self.location
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    /// Length of the horizontal (last) axis.
    pub fn n_space(&self) -> usize {
        self.values.shape()[self.values.ndim() - 1]
    }

    /// Length of the time axis, if any.
    pub fn n_time(&self) -> Option<usize> {
        self.layout.has_time().then(|| self.values.shape()[0])
    }

    /// Length of the level axis, if any.
    pub fn n_levels(&self) -> Option<usize> {
        match self.layout {
            FieldLayout::LevelSpace => Some(self.values.shape()[0]),
            FieldLayout::TimeLevelSpace => Some(self.values.shape()[1]),
            _ => None,
        }
    }

    /// Total number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// View as `(time, level, space)`.
    pub fn view3(&self) -> Result<ArrayView3<'_, f64>> {
        self.values
            .view()
            .into_dimensionality()
            .map_err(|_| FieldError::shape(&self.name, "3 dimensions", self.layout.label()))
    }

    /// View as a rank-2 array (`(time, space)` or `(level, space)`).
    pub fn view2(&self) -> Result<ArrayView2<'_, f64>> {
        self.values
            .view()
            .into_dimensionality()
            .map_err(|_| FieldError::shape(&self.name, "2 dimensions", self.layout.label()))
    }

    /// View as `(space)`.
    pub fn view1(&self) -> Result<ArrayView1<'_, f64>> {
        self.values
            .view()
            .into_dimensionality()
            .map_err(|_| FieldError::shape(&self.name, "1 dimension", self.layout.label()))
    }

    /// Values at one horizontal position; the result keeps the time and
    /// level axes in their original order.
    pub fn at_space(&self, index: usize) -> Result<ArrayD<f64>> {
        let n = self.n_space();
        if index >= n {
            return Err(FieldError::shape(
                &self.name,
                format!("space index < {}", n),
                index.to_string(),
            ));
        }
        let axis = Axis(self.values.ndim() - 1);
        Ok(self.values.index_axis(axis, index).to_owned())
    }

    /// Keep only the horizontal positions in `indices` (in that order).
    pub fn select_space(&self, indices: &[usize]) -> Result<StateField> {
        let n = self.n_space();
        if let Some(&bad) = indices.iter().find(|&&i| i >= n) {
            return Err(FieldError::shape(
                &self.name,
                format!("space index < {}", n),
                bad.to_string(),
            ));
        }
        let axis = Axis(self.values.ndim() - 1);
        Ok(Self {
            name: self.name.clone(),
            values: self.values.select(axis, indices),
            layout: self.layout,
            location: self.location,
        })
    }

    /// Keep only the time steps in `indices`. Static fields are returned
    /// unchanged.
    pub fn select_time(&self, indices: &[usize]) -> Result<StateField> {
        let Some(n_time) = self.n_time() else {
            return Ok(self.clone());
        };
        if let Some(&bad) = indices.iter().find(|&&i| i >= n_time) {
            return Err(FieldError::shape(
                &self.name,
                format!("time index < {}", n_time),
                bad.to_string(),
            ));
        }
        Ok(Self {
            name: self.name.clone(),
            values: self.values.select(Axis(0), indices),
            layout: self.layout,
            location: self.location,
        })
    }

    /// Mean over the time axis; static fields are returned as-is.
    ///
    /// An empty time axis yields NaN.
    pub fn time_mean(&self) -> ArrayD<f64> {
        if !self.layout.has_time() {
            return self.values.clone();
        }
        let n = self.values.shape()[0];
        if n == 0 {
            let mut shape = self.values.shape().to_vec();
            shape.remove(0);
            return ArrayD::from_elem(IxDyn(&shape), f64::NAN);
        }
        self.values.sum_axis(Axis(0)) / n as f64
    }

    /// Rename (used when a derived field is stored under its canonical name).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
