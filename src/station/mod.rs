//! Station output: model time series saved at named points.
//!
//! Reuses the depth, speed, shear and direction kernels of the mesh engine on
//! single-station columns.

mod series;

pub use series::{StationRef, StationSeries, StationSeriesBuilder};
