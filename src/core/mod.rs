//! Core logic – gesture recognition, scroll surfaces, and the collection model.
//!
//! Nothing in this module depends on any TUI or rendering crate.  Geometry
//! is in logical pixels; the UI layer decides how terminal cells map to them.

pub mod collection;
pub mod error;
pub mod gesture;
pub mod surface;
