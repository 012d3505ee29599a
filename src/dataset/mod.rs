//! A loaded FVCOM run: mesh, time axis, raw variables and the derived-field
//! cache.
//!
//! # Example
//! ```ignore
//! use fvcom_rs::dataset::FvcomDataset;
//! use fvcom_rs::time::TimeSelector;
//!
//! let mut data = FvcomDataset::new(mesh, time, raw, EngineConfig::default())?;
//! let speed = data.velo_norm()?;                 // computed once, then cached
//! let profile = data.verti_shear_at_point(
//!     -66.34, 44.26, &TimeSelector::timestamps("2013-06-01T00:00:00", "2013-06-02T00:00:00"),
//!     None, None)?;
//! for entry in data.log() {
//!     println!("{}", entry);
//! }
//! ```

mod derived;
mod point;

use std::sync::Arc;

use log::info;

use crate::config::EngineConfig;
use crate::engine::DerivedFieldEngine;
use crate::error::{FieldError, Result};
use crate::fields::{Capabilities, ComputationLogEntry, DerivedKind, FieldCache, RawFields, StateField};
use crate::mesh::MeshIndex;
use crate::spatial::SpatialLookup;
use crate::time::{TimeAxis, TimeSelector};
use crate::transect::{Transect, TransectExtractor, TransectSection};

/// Owns everything needed to derive fields for one model run.
///
/// Derived fields are computed on first request and shared as `Arc`s
/// afterwards. Operations that may compute take `&mut self`; wrap the dataset
/// in a `Mutex` to share it across threads.
#[derive(Debug)]
pub struct FvcomDataset {
    mesh: MeshIndex,
    time: TimeAxis,
    raw: RawFields,
    capabilities: Capabilities,
    config: EngineConfig,
    cache: FieldCache,
}

impl FvcomDataset {
    /// Validate the raw variables against the mesh and time axis.
    pub fn new(mesh: MeshIndex, time: TimeAxis, raw: RawFields, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let capabilities = raw.validate(&mesh, time.len())?;

        let mut cache = FieldCache::new();
        if let Some(bounds) = mesh.bounding_box() {
            cache.record(ComputationLogEntry::new(
                "grid",
                format!("Bounding box = {}", bounds),
            ));
        }
        info!(
            "Dataset: {} nodes, {} elements, {} levels, {} time steps (3D: {})",
            mesh.n_nodes(),
            mesh.n_elements(),
            mesh.n_levels(),
            time.len(),
            capabilities.is_3d
        );

        Ok(Self {
            mesh,
            time,
            raw,
            capabilities,
            config,
            cache,
        })
    }

    pub fn mesh(&self) -> &MeshIndex {
        &self.mesh
    }

    pub fn time(&self) -> &TimeAxis {
        &self.time
    }

    pub fn raw(&self) -> &RawFields {
        &self.raw
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn is_3d(&self) -> bool {
        self.capabilities.is_3d
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &FieldCache {
        &self.cache
    }

    /// Ordered computation history, starting with the grid entry.
    pub fn log(&self) -> &[ComputationLogEntry] {
        self.cache.log()
    }

    pub fn lookup(&self) -> SpatialLookup<'_> {
        SpatialLookup::new(&self.mesh, self.config.distance)
    }

    pub fn engine(&self) -> DerivedFieldEngine<'_> {
        DerivedFieldEngine::new(&self.mesh, &self.raw, self.capabilities, &self.config)
    }

    /// Engine and cache borrowed together, so a computation can be stored
    /// while the engine reads the rest of the dataset.
    fn split(&mut self) -> (DerivedFieldEngine<'_>, &mut FieldCache) {
        let engine =
            DerivedFieldEngine::new(&self.mesh, &self.raw, self.capabilities, &self.config);
        (engine, &mut self.cache)
    }

    pub fn resolve_time(&self, selector: &TimeSelector) -> Result<Vec<usize>> {
        self.time.resolve(selector)
    }

    /// A raw or derived variable by name, computing derived ones on demand.
    pub fn variable(&mut self, name: &str) -> Result<Arc<StateField>> {
        if let Some(field) = self.raw.get(name) {
            return Ok(field);
        }
        match DerivedKind::from_name(name) {
            Some(kind) => self.compute(kind),
            None => Err(FieldError::missing(name, "variable lookup")),
        }
    }

    /// Compute (or fetch) a derived field with its default arguments.
    pub fn compute(&mut self, kind: DerivedKind) -> Result<Arc<StateField>> {
        match kind {
            DerivedKind::Depth => self.depth(),
            DerivedKind::VeloNorm => self.velo_norm(),
            DerivedKind::HoriVeloNorm => self.hori_velo_norm(),
            DerivedKind::VertiShear => self.verti_shear(),
            DerivedKind::FlowDir => self.flow_dir(),
            DerivedKind::Vorticity => self.vorticity(),
            DerivedKind::PowerDensity => self.power_density(),
            DerivedKind::PowerAssessment => self.power_assessment(),
        }
    }

    // =========================================================================
    // Transects
    // =========================================================================

    /// Extractor over this dataset; keep it to reuse the element graph
    /// across several paths.
    pub fn transect_extractor(&self) -> TransectExtractor<'_> {
        TransectExtractor::new(self.engine(), self.lookup())
    }

    /// Shortest path over the mesh between two points.
    pub fn transect(&self, start: (f64, f64), end: (f64, f64)) -> Result<Transect> {
        self.transect_extractor().path(start, end)
    }

    /// Time-mean section of `field` along `transect`.
    pub fn sample_transect(
        &self,
        field: &StateField,
        transect: &Transect,
        selector: &TimeSelector,
    ) -> Result<TransectSection> {
        let steps = self.time.resolve(selector)?;
        self.transect_extractor().sample(field, transect, &steps)
    }

    /// Section of a raw or derived variable between two points.
    pub fn sample_transect_named(
        &mut self,
        name: &str,
        start: (f64, f64),
        end: (f64, f64),
        selector: &TimeSelector,
    ) -> Result<TransectSection> {
        let field = self.variable(name)?;
        let steps = self.time.resolve(selector)?;
        let extractor = self.transect_extractor();
        let transect = extractor.path(start, end)?;
        extractor.sample(&field, &transect, &steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::GridLocation;
    use crate::mesh::Coordinates;
    use ndarray::{Array1, Array2, Array3};

    /// Two triangles, two levels, three time steps, everything flowing east.
    pub(super) fn dataset() -> FvcomDataset {
        let mesh = MeshIndex::builder()
            .with_nodes(Coordinates::new(
                vec![0.0, 1.0, 0.0, 1.0],
                vec![0.0, 0.0, 1.0, 1.0],
                vec![0.0, 1.0, 0.0, 1.0],
                vec![0.0, 0.0, 1.0, 1.0],
            ))
            .with_trinodes(vec![[0, 1, 2], [1, 3, 2]])
            .with_siglay(StateField::level_space(
                "siglay",
                Array2::from_shape_fn((2, 4), |(l, _)| if l == 0 { -0.25 } else { -0.75 }),
                GridLocation::Node,
            ))
            .with_bathymetry(StateField::space(
                "h",
                Array1::from_elem(4, 10.0),
                GridLocation::Node,
            ))
            .build()
            .unwrap();
        let time = TimeAxis::from_datenums(vec![735000.0, 735000.5, 735001.0]).unwrap();

        let u = Array3::from_shape_fn((3, 2, 2), |(t, l, _)| 1.0 + t as f64 - 0.5 * l as f64);
        let v = Array3::zeros((3, 2, 2));
        let raw = RawFields::new()
            .with_velocity(
                StateField::time_level_space("u", u, GridLocation::Element),
                StateField::time_level_space("v", v, GridLocation::Element),
            )
            .with_elevation(StateField::time_space(
                "zeta",
                Array2::zeros((3, 4)),
                GridLocation::Node,
            ));
        FvcomDataset::new(mesh, time, raw, EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_grid_entry_first() {
        let data = dataset();
        assert_eq!(data.log().len(), 1);
        assert_eq!(data.log()[0].field_name, "grid");
        assert!(data.log()[0].message.starts_with("Bounding box = "));
        assert!(data.cache().is_empty());
    }

    #[test]
    fn test_variable_lookup() {
        let mut data = dataset();
        assert_eq!(data.variable("zeta").unwrap().name(), "el");
        assert_eq!(data.variable("velo_norm").unwrap().name(), "velo_norm");
        assert!(matches!(
            data.variable("salinity"),
            Err(FieldError::MissingField { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_config() {
        let data = dataset();
        let result = FvcomDataset::new(
            data.mesh.clone(),
            data.time.clone(),
            data.raw.clone(),
            EngineConfig::default().with_rho_seawater(-1.0),
        );
        assert!(matches!(result, Err(FieldError::Config(_))));
    }
}
