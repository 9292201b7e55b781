//! Two-body orbital mechanics.

pub mod orbits;

pub use orbits::{orbit_trace, period, position, OrbitalElements, AU_SCALE};
