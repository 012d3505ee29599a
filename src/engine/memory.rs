//! Allocation guard for full-domain computations.

use log::debug;
use sysinfo::System;

use crate::error::{FieldError, Result};

/// Bytes currently available to the process, as reported by the OS.
///
/// Returns 0 where the platform does not report memory.
pub fn available_memory() -> u64 {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.available_memory()
}

/// Refuses full-domain allocations larger than a budget.
#[derive(Clone, Copy, Debug)]
pub struct MemoryGuard {
    limit: Option<u64>,
}

impl MemoryGuard {
    /// `None` checks against [`available_memory`] at each request.
    pub fn new(limit: Option<u64>) -> Self {
        Self { limit }
    }

    /// Check that `n_arrays` arrays of `n_values` f64 each fit.
    pub fn check(&self, field: &str, n_values: usize, n_arrays: usize) -> Result<()> {
        let requested = (n_values as u64)
            .saturating_mul(n_arrays as u64)
            .saturating_mul(std::mem::size_of::<f64>() as u64);
        let available = match self.limit {
            Some(limit) => limit,
            None => available_memory(),
        };
        if available == 0 {
            debug!("{}: available memory unknown, skipping check", field);
            return Ok(());
        }
        if requested > available {
            return Err(FieldError::insufficient_memory(field, requested, available));
        }
        debug!(
            "{}: estimated {} bytes of {} available",
            field, requested, available
        );
        Ok(())
    }
}
