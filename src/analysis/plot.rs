//! Plot payloads handed to an external renderer.
//!
//! The crate prepares arrays and labels; drawing is the job of whatever
//! implements [`Plotter`].

use ndarray::{Array1, Array2};

/// Line plot of `values` against `depths`.
#[derive(Clone, Debug, PartialEq)]
pub struct XyPlot {
    pub values: Array1<f64>,
    pub depths: Array1<f64>,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl XyPlot {
    pub fn new(
        values: Array1<f64>,
        depths: Array1<f64>,
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            values,
            depths,
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
        }
    }
}

/// Filled-contour section along a transect.
///
/// `distance` has one entry per column, `depth` and `values` are `(L, P)`.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionPlot {
    pub distance: Array1<f64>,
    pub depth: Array2<f64>,
    pub values: Array2<f64>,
    /// Contour levels, ascending.
    pub levels: Vec<f64>,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

/// Number of contour levels used when none are given.
pub const DEFAULT_CONTOUR_LEVELS: usize = 21;

/// `n` evenly spaced levels from `min` to `max` inclusive.
///
/// A flat range (`min == max`) yields a single level.
pub fn contour_levels(min: f64, max: f64, n: usize) -> Vec<f64> {
    if n < 2 || !(max > min) {
        return vec![min];
    }
    let step = (max - min) / (n - 1) as f64;
    (0..n).map(|i| min + step * i as f64).collect()
}

/// External renderer.
pub trait Plotter {
    type Error;

    fn plot_xy(&mut self, plot: &XyPlot) -> Result<(), Self::Error>;

    fn plot_section(&mut self, plot: &SectionPlot) -> Result<(), Self::Error>;
}
