//! # epochcrate M3C2
//!
//! Typed glue around an external M3C2 (Multiscale Model to Model Cloud
//! Comparison) engine:
//!
//! - [`M3C2Params`] replaces the string-keyed parameter dictionary and reads
//!   and writes the engine's `[General]` parameter file
//! - [`PointCloudEngine`] is the capability-checked seam to the backend
//! - [`PrecisionMaps`] bundles the per-point displacement channels
//! - [`acceptance`] and [`experiment`] check comparison results against
//!   expected tolerances

pub mod params;
pub mod engine;
pub mod precision;
pub mod acceptance;
pub mod experiment;

// Re-export commonly used items
pub use params::*;
pub use engine::*;
pub use precision::*;
pub use acceptance::*;
pub use experiment::*;
