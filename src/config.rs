//! Engine configuration.
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! rho_seawater = 1027.0
//! distance = "haversine"
//! memory_limit_bytes = 2_000_000_000
//!
//! [turbine]
//! cut_in = 0.8
//! cut_out = 3.5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result};
use crate::spatial::DistanceMetric;

/// Settings shared by every derived-field computation on a dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seawater density (kg/m³) used by the power formulas.
    pub rho_seawater: f64,
    /// Metric for nearest-element search.
    pub distance: DistanceMetric,
    /// Upper bound on a single full-domain allocation. `None` asks the OS
    /// for the currently available memory.
    pub memory_limit_bytes: Option<u64>,
    /// Turbine curve for `power_assessment`.
    pub turbine: TurbineConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rho_seawater: 1025.0,
            distance: DistanceMetric::Planar,
            memory_limit_bytes: None,
            turbine: TurbineConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_rho_seawater(mut self, rho: f64) -> Self {
        self.rho_seawater = rho;
        self
    }

    pub fn with_distance(mut self, distance: DistanceMetric) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.memory_limit_bytes = Some(bytes);
        self
    }

    pub fn with_turbine(mut self, turbine: TurbineConfig) -> Self {
        self.turbine = turbine;
        self
    }

    /// Check physical consistency.
    pub fn validate(&self) -> Result<()> {
        if !(self.rho_seawater.is_finite() && self.rho_seawater > 0.0) {
            return Err(FieldError::Config(format!(
                "rho_seawater must be positive, got {}",
                self.rho_seawater
            )));
        }
        if self.memory_limit_bytes == Some(0) {
            return Err(FieldError::Config("memory_limit_bytes must be > 0".into()));
        }
        self.turbine.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| FieldError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FieldError::Config(e.to_string()))
    }
}

/// Tidal turbine power curve.
///
/// - power curve: `pc(u) = a4·u⁴ + a3·u³ + a2·u² + a1·u + a0`
/// - device controlled power coefficient: `dcpc = b2·tsr² + b1·tsr + b0`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurbineConfig {
    /// Cut-in speed (m/s)
    pub cut_in: f64,
    /// Cut-out speed (m/s)
    pub cut_out: f64,
    /// Tip speed ratio
    pub tsr: f64,
    pub a4: f64,
    pub a3: f64,
    pub a2: f64,
    pub a1: f64,
    pub a0: f64,
    pub b2: f64,
    pub b1: f64,
    pub b0: f64,
}

impl Default for TurbineConfig {
    fn default() -> Self {
        Self {
            cut_in: 1.0,
            cut_out: 4.5,
            tsr: 4.3,
            a4: 0.002,
            a3: -0.03,
            a2: 0.1,
            a1: -0.1,
            a0: 0.8,
            b2: -0.02,
            b1: 0.2,
            b0: -0.005,
        }
    }
}

impl TurbineConfig {
    pub fn with_speeds(mut self, cut_in: f64, cut_out: f64) -> Self {
        self.cut_in = cut_in;
        self.cut_out = cut_out;
        self
    }

    pub fn with_tsr(mut self, tsr: f64) -> Self {
        self.tsr = tsr;
        self
    }

    /// Power curve coefficients, highest order first.
    pub fn with_power_curve(mut self, a4: f64, a3: f64, a2: f64, a1: f64, a0: f64) -> Self {
        self.a4 = a4;
        self.a3 = a3;
        self.a2 = a2;
        self.a1 = a1;
        self.a0 = a0;
        self
    }

    /// Device coefficient polynomial, highest order first.
    pub fn with_device_curve(mut self, b2: f64, b1: f64, b0: f64) -> Self {
        self.b2 = b2;
        self.b1 = b1;
        self.b0 = b0;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.cut_in >= 0.0 && self.cut_in < self.cut_out) {
            return Err(FieldError::Config(format!(
                "turbine needs 0 <= cut_in < cut_out, got {} and {}",
                self.cut_in, self.cut_out
            )));
        }
        Ok(())
    }
}
