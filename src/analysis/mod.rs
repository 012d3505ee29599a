//! Profiles and plot payloads.
//!
//! Point, station and transect queries return the structures defined here;
//! each can turn itself into a payload for an external [`Plotter`].

mod plot;
mod profile;

pub use plot::{contour_levels, Plotter, SectionPlot, XyPlot, DEFAULT_CONTOUR_LEVELS};
pub use profile::{time_mean, FlowDirection, ShearProfile, VelocityProfile};
