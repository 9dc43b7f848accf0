//! Core data structures and traits for epochcrate
//! 
//! This crate provides the fundamental types shared by the fixture generator
//! and the comparison glue: points, named scalar fields, point clouds that
//! carry them, and the common error type.

pub mod point;
pub mod scalar_field;
pub mod point_cloud;
pub mod traits;
pub mod error;

pub use point::*;
pub use scalar_field::*;
pub use point_cloud::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::Point3;
