//! # fvcom-rs
//!
//! Derived-field engine for unstructured triangular-mesh ocean model output
//! (FVCOM-style sigma-coordinate runs).
//!
//! This crate provides:
//! - Mesh topology with ghost-backed neighbor lookup and gradient
//!   reconstruction coefficients
//! - Time axis resolution from index lists, index ranges or timestamps
//! - Nearest-element lookup (planar or haversine)
//! - Depth, current speed, vertical shear, flow direction, vorticity and
//!   tidal power, full-domain or at a single point
//! - A write-once field cache with a computation history
//! - Shortest-path transects and vertical sections
//! - Station output with lookup by name
//!
//! Loading model files and rendering plots are left to the caller.

pub mod analysis;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod fields;
pub mod mesh;
pub mod spatial;
pub mod station;
pub mod time;
pub mod transect;
pub mod types;

// Re-export main types for convenience
pub use analysis::{FlowDirection, Plotter, SectionPlot, ShearProfile, VelocityProfile, XyPlot};
pub use config::{EngineConfig, TurbineConfig};
pub use dataset::FvcomDataset;
pub use engine::{DerivedFieldEngine, LevelRange};
pub use error::{FieldError, Result};
pub use fields::{
    ComputationLogEntry, DerivedKind, FieldCache, FieldLayout, GridLocation, RawFields, StateField,
};
pub use mesh::{Coordinates, MeshIndex, MeshIndexBuilder, NeighborEncoding};
pub use spatial::{DistanceMetric, SpatialLookup};
pub use station::{StationRef, StationSeries};
pub use time::{TimeAxis, TimeBound, TimeSelector};
pub use transect::{Transect, TransectExtractor, TransectSection};
pub use types::{ElementIndex, GeoBounds, StationIndex};
