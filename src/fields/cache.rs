//! Per-dataset store of derived fields.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::info;

use super::StateField;
use crate::error::Result;

/// Every field the engine can derive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DerivedKind {
    Depth,
    VeloNorm,
    HoriVeloNorm,
    VertiShear,
    FlowDir,
    Vorticity,
    PowerDensity,
    PowerAssessment,
}

impl DerivedKind {
    pub const ALL: [DerivedKind; 8] = [
        DerivedKind::Depth,
        DerivedKind::VeloNorm,
        DerivedKind::HoriVeloNorm,
        DerivedKind::VertiShear,
        DerivedKind::FlowDir,
        DerivedKind::Vorticity,
        DerivedKind::PowerDensity,
        DerivedKind::PowerAssessment,
    ];

    /// Name the field is stored and queried under.
    pub fn name(self) -> &'static str {
        match self {
            DerivedKind::Depth => "depth",
            DerivedKind::VeloNorm => "velo_norm",
            DerivedKind::HoriVeloNorm => "hori_velo_norm",
            DerivedKind::VertiShear => "verti_shear",
            DerivedKind::FlowDir => "flow_dir",
            DerivedKind::Vorticity => "vorticity",
            DerivedKind::PowerDensity => "power_density",
            DerivedKind::PowerAssessment => "power_assessment",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Message recorded in the computation log.
    fn log_message(self) -> &'static str {
        match self {
            DerivedKind::Depth => "depth computed",
            DerivedKind::VeloNorm => "velocity norm computed",
            DerivedKind::HoriVeloNorm => "horizontal velocity norm computed",
            DerivedKind::VertiShear => "vertical shear computed",
            DerivedKind::FlowDir => "flow directions computed",
            DerivedKind::Vorticity => "vorticity computed",
            DerivedKind::PowerDensity => "power density computed",
            DerivedKind::PowerAssessment => "power assessment computed",
        }
    }
}

impl fmt::Display for DerivedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One line of a dataset's history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComputationLogEntry {
    pub field_name: String,
    pub message: String,
}

impl ComputationLogEntry {
    pub fn new(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ComputationLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_name, self.message)
    }
}

/// Write-once store of derived fields plus the ordered history.
///
/// A field is computed at most once; later requests return the same `Arc`.
/// Failed computations leave no trace.
#[derive(Debug, Default)]
pub struct FieldCache {
    fields: HashMap<DerivedKind, Arc<StateField>>,
    log: Vec<ComputationLogEntry>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: DerivedKind) -> Option<Arc<StateField>> {
        self.fields.get(&kind).cloned()
    }

    pub fn contains(&self, kind: DerivedKind) -> bool {
        self.fields.contains_key(&kind)
    }

    /// Return the stored field, or run `compute` and store its result.
    pub fn get_or_compute<F>(&mut self, kind: DerivedKind, compute: F) -> Result<Arc<StateField>>
    where
        F: FnOnce() -> Result<StateField>,
    {
        if let Some(field) = self.fields.get(&kind) {
            return Ok(Arc::clone(field));
        }
        let field = Arc::new(compute()?.with_name(kind.name()));
        self.fields.insert(kind, Arc::clone(&field));
        self.log
            .push(ComputationLogEntry::new(kind.name(), kind.log_message()));
        info!("{} added to dataset variables {:?}", kind, field.shape());
        Ok(field)
    }

    /// Append a history line that is not tied to a derived field.
    pub fn record(&mut self, entry: ComputationLogEntry) {
        self.log.push(entry);
    }

    pub fn log(&self) -> &[ComputationLogEntry] {
        &self.log
    }

    /// Kinds currently stored, in declaration order.
    pub fn kinds(&self) -> Vec<DerivedKind> {
        let mut kinds: Vec<_> = self.fields.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
