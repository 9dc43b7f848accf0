//! # epochcrate fixtures
//!
//! Reproducible synthetic point clouds for exercising distance-based
//! comparison algorithms such as M3C2.
//!
//! Each generated epoch samples the radial surface `z = sin(3r) / r` at
//! random `(x, y)` locations, perturbs it with noise proportional to the
//! radius, and records that noise magnitude in a `uz` scalar field next to
//! zero-filled `ux` and `uy` fields.

pub mod config;
pub mod surface;

// Re-export commonly used items
pub use config::*;
pub use surface::*;
