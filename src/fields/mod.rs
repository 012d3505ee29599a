//! Field storage.
//!
//! - [`StateField`]: named array with explicit layout and grid location
//! - [`RawFields`]: loader-supplied variables and the [`Capabilities`] they imply
//! - [`FieldCache`]: write-once store of derived fields and the computation log

mod array;
mod cache;
mod raw;

pub use array::{FieldLayout, GridLocation, StateField};
pub use cache::{ComputationLogEntry, DerivedKind, FieldCache};
pub use raw::{Capabilities, RawFields};
