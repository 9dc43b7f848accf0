//! The seam to an external point cloud comparison engine
//!
//! The M3C2 computation itself lives in a native library. Code in this
//! workspace talks to it only through [`PointCloudEngine`], which keeps the
//! capability check separate from fixture generation and result validation.

use crate::params::M3C2Params;
use crate::precision::PrecisionMaps;
use epochcrate_core::{Error, PointCloud, Result};
use std::path::Path;

/// Scalar field holding the signed distance along the normal
pub const M3C2_DISTANCE: &str = "M3C2 distance";

/// Scalar field holding the per-point distance uncertainty
pub const DISTANCE_UNCERTAINTY: &str = "distance uncertainty";

/// The two epochs being compared
#[derive(Debug, Clone, Copy)]
pub struct EpochPair<'a> {
    /// Earlier epoch, also the default source of core points
    pub reference: &'a PointCloud,
    /// Later epoch
    pub compared: &'a PointCloud,
}

impl<'a> EpochPair<'a> {
    pub fn new(reference: &'a PointCloud, compared: &'a PointCloud) -> Self {
        Self { reference, compared }
    }

    pub fn clouds(&self) -> [&'a PointCloud; 2] {
        [self.reference, self.compared]
    }
}

/// A backend able to compare two point clouds.
pub trait PointCloudEngine {
    /// Human readable backend name
    fn name(&self) -> &str;

    /// Whether the distance comparison is available in this backend
    fn supports_distance_comparison(&self) -> bool;

    /// Let the backend estimate scales suited to the two clouds
    fn guess_params(&self, epochs: EpochPair<'_>) -> Result<M3C2Params>;

    /// Run the comparison.
    ///
    /// The returned cloud carries at least an [`M3C2_DISTANCE`] field, and a
    /// [`DISTANCE_UNCERTAINTY`] field when `precision` is given.
    fn compute_m3c2(
        &self,
        epochs: EpochPair<'_>,
        params: &M3C2Params,
        precision: Option<&PrecisionMaps<'_>>,
    ) -> Result<PointCloud>;

    /// Persist a set of clouds into a single archive file
    fn save_entities(&self, clouds: &[&PointCloud], path: &Path) -> Result<()>;
}

/// Engine used when no comparison backend is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableEngine;

impl UnavailableEngine {
    fn unsupported<T>(operation: &str) -> Result<T> {
        Err(Error::Unsupported(format!(
            "{} requires a point cloud comparison backend",
            operation
        )))
    }
}

impl PointCloudEngine for UnavailableEngine {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn supports_distance_comparison(&self) -> bool {
        false
    }

    fn guess_params(&self, _epochs: EpochPair<'_>) -> Result<M3C2Params> {
        Self::unsupported("M3C2 parameter guessing")
    }

    fn compute_m3c2(
        &self,
        _epochs: EpochPair<'_>,
        _params: &M3C2Params,
        _precision: Option<&PrecisionMaps<'_>>,
    ) -> Result<PointCloud> {
        Self::unsupported("M3C2 distance computation")
    }

    fn save_entities(&self, _clouds: &[&PointCloud], _path: &Path) -> Result<()> {
        Self::unsupported("saving entities")
    }
}
