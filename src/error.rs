//! Error taxonomy for derived-field computation.
//!
//! Every fallible operation in the crate returns [`Result<T>`]. Variants carry
//! enough context (field name, requested range, point) for the caller to act
//! on the failure without re-running the computation.

use thiserror::Error;

/// Hint attached to every [`FieldError::InsufficientMemory`].
pub const SUBSET_HINT: &str =
    "restrict the dataset spatially (bounding box) or temporally (time window) at load time";

/// Error type for the derived-field engine.
#[derive(Debug, Error)]
pub enum FieldError {
    /// Conflicting or malformed time/station selector.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Requested time range lies outside the time axis.
    #[error("Time range {requested} outside axis [{axis_start}, {axis_end}]")]
    InvalidTimeRange {
        requested: String,
        axis_start: f64,
        axis_end: f64,
    },

    /// A raw field needed by a formula is absent and no fallback exists.
    #[error("Missing field '{field}' required to compute {required_by}")]
    MissingField {
        field: String,
        required_by: String,
    },

    /// A full-domain computation would not fit in memory.
    #[error(
        "Insufficient memory to compute {field}: needs {requested_bytes} bytes, \
         {available_bytes} available; {hint}"
    )]
    InsufficientMemory {
        field: String,
        requested_bytes: u64,
        available_bytes: u64,
        hint: &'static str,
    },

    /// Station lookup by index or name failed.
    #[error("Station not found: {0}")]
    StationNotFound(String),

    /// Mesh topology or coefficient arrays are inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Array shape does not match the mesh/time dimensions.
    #[error("Shape mismatch for '{field}': expected {expected}, got {actual}")]
    ShapeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// Sigma level range outside the available levels.
    #[error("Invalid level range [{bot}, {top}] for {n_levels} levels")]
    InvalidLevelRange {
        bot: usize,
        top: usize,
        n_levels: usize,
    },

    /// No element path connects two points.
    #[error("No path between elements {from} and {to}")]
    NoPath { from: usize, to: usize },

    /// Invalid engine configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FieldError {
    pub fn missing(field: impl Into<String>, required_by: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            required_by: required_by.into(),
        }
    }

    pub fn shape(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn insufficient_memory(field: impl Into<String>, requested: u64, available: u64) -> Self {
        Self::InsufficientMemory {
            field: field.into(),
            requested_bytes: requested,
            available_bytes: available,
            hint: SUBSET_HINT,
        }
    }

    pub fn time_range(requested: impl Into<String>, axis_start: f64, axis_end: f64) -> Self {
        Self::InvalidTimeRange {
            requested: requested.into(),
            axis_start,
            axis_end,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FieldError>;
