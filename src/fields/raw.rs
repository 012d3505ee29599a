//! Model output supplied by the loader.

use std::sync::Arc;

use super::{FieldLayout, GridLocation, StateField};
use crate::error::{FieldError, Result};
use crate::mesh::MeshIndex;

/// What a dataset can compute, decided once at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Layered `u`/`v` are present.
    pub is_3d: bool,
    /// Vertical velocity `w` is present.
    pub has_vertical_velocity: bool,
    /// Depth-averaged `ua`/`va` are present.
    pub has_depth_averaged: bool,
}

/// Immutable raw variables of one dataset.
///
/// - `u`, `v`, `w`: `(T, L, E)`
/// - `ua`, `va`: `(T, E)`
/// - `el`: `(T, N)` or `(T, E)`
#[derive(Clone, Debug, Default)]
pub struct RawFields {
    u: Option<Arc<StateField>>,
    v: Option<Arc<StateField>>,
    w: Option<Arc<StateField>>,
    ua: Option<Arc<StateField>>,
    va: Option<Arc<StateField>>,
    el: Option<Arc<StateField>>,
}

impl RawFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layered horizontal velocity.
    pub fn with_velocity(mut self, u: StateField, v: StateField) -> Self {
        self.u = Some(Arc::new(u.with_name("u")));
        self.v = Some(Arc::new(v.with_name("v")));
        self
    }

    pub fn with_vertical_velocity(mut self, w: StateField) -> Self {
        self.w = Some(Arc::new(w.with_name("w")));
        self
    }

    /// Depth-averaged velocity.
    pub fn with_depth_averaged_velocity(mut self, ua: StateField, va: StateField) -> Self {
        self.ua = Some(Arc::new(ua.with_name("ua")));
        self.va = Some(Arc::new(va.with_name("va")));
        self
    }

    /// Free-surface elevation (`el` / `zeta`).
    pub fn with_elevation(mut self, el: StateField) -> Self {
        self.el = Some(Arc::new(el.with_name("el")));
        self
    }

    pub fn u(&self) -> Option<&StateField> {
        self.u.as_deref()
    }

    pub fn v(&self) -> Option<&StateField> {
        self.v.as_deref()
    }

    pub fn w(&self) -> Option<&StateField> {
        self.w.as_deref()
    }

    pub fn ua(&self) -> Option<&StateField> {
        self.ua.as_deref()
    }

    pub fn va(&self) -> Option<&StateField> {
        self.va.as_deref()
    }

    pub fn el(&self) -> Option<&StateField> {
        self.el.as_deref()
    }

    /// Look up a raw variable by name (`zeta` is an alias of `el`).
    pub fn get(&self, name: &str) -> Option<Arc<StateField>> {
        let slot = match name {
            "u" => &self.u,
            "v" => &self.v,
            "w" => &self.w,
            "ua" => &self.ua,
            "va" => &self.va,
            "el" | "zeta" => &self.el,
            _ => return None,
        };
        slot.clone()
    }

    /// Check every supplied variable against the mesh and time axis.
    pub fn validate(&self, mesh: &MeshIndex, n_time: usize) -> Result<Capabilities> {
        let n_levels = mesh.n_levels();
        let n_elements = mesh.n_elements();

        if self.u.is_some() != self.v.is_some() {
            return Err(FieldError::missing(
                if self.u.is_some() { "v" } else { "u" },
                "layered velocity",
            ));
        }
        if self.ua.is_some() != self.va.is_some() {
            return Err(FieldError::missing(
                if self.ua.is_some() { "va" } else { "ua" },
                "depth-averaged velocity",
            ));
        }

        for f in [&self.u, &self.v, &self.w].into_iter().flatten() {
            expect(f, FieldLayout::TimeLevelSpace, &[n_time, n_levels, n_elements])?;
            expect_location(f, GridLocation::Element)?;
        }
        for f in [&self.ua, &self.va].into_iter().flatten() {
            expect(f, FieldLayout::TimeSpace, &[n_time, n_elements])?;
            expect_location(f, GridLocation::Element)?;
        }
        if let Some(el) = &self.el {
            let n_space = match el.location() {
                GridLocation::Node => mesh.n_nodes(),
                _ => n_elements,
            };
            expect(el, FieldLayout::TimeSpace, &[n_time, n_space])?;
        }

        Ok(Capabilities {
            is_3d: self.u.is_some(),
            has_vertical_velocity: self.w.is_some(),
            has_depth_averaged: self.ua.is_some(),
        })
    }
}

fn expect(field: &StateField, layout: FieldLayout, shape: &[usize]) -> Result<()> {
    if field.layout() != layout || field.shape() != shape {
        return Err(FieldError::shape(
            field.name(),
            format!("{:?} {:?}", layout, shape),
            format!("{:?} {:?}", field.layout(), field.shape()),
        ));
    }
    Ok(())
}

fn expect_location(field: &StateField, location: GridLocation) -> Result<()> {
    if field.location() != location {
        return Err(FieldError::shape(
            field.name(),
            format!("{:?} location", location),
            format!("{:?} location", field.location()),
        ));
    }
    Ok(())
}
