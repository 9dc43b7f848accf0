//! Tolerance checks on comparison results

use crate::engine::{DISTANCE_UNCERTAINTY, M3C2_DISTANCE};
use epochcrate_core::{Error, PointCloud, Result, ScalarField};
use tracing::info;

/// Relative closeness with no absolute floor: `|a - b| <= rel_tol * max(|a|, |b|)`
pub fn is_close(a: f64, b: f64, rel_tol: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= rel_tol * a.abs().max(b.abs())
}

/// Fail with [`Error::Tolerance`] unless `actual` is close to `expected`
pub fn ensure_close(what: &str, actual: f64, expected: f64, rel_tol: f64) -> Result<()> {
    if is_close(actual, expected, rel_tol) {
        info!(what, actual, expected, rel_tol, "within tolerance");
        Ok(())
    } else {
        Err(Error::Tolerance {
            what: what.to_string(),
            actual,
            expected,
            rel_tol,
        })
    }
}

pub fn ensure_min_scalar_fields(cloud: &PointCloud, min: usize) -> Result<()> {
    if cloud.scalar_field_count() < min {
        return Err(Error::InvalidData(format!(
            "cloud '{}' has {} scalar fields, expected at least {}",
            cloud.name(),
            cloud.scalar_field_count(),
            min
        )));
    }
    Ok(())
}

fn empty_field(field: &ScalarField) -> Error {
    Error::InvalidData(format!("scalar field '{}' is empty", field.name()))
}

/// Check the extremes of the distance field
pub fn check_distance_range(
    result: &PointCloud,
    expected_max: f64,
    expected_min: f64,
    rel_tol: f64,
) -> Result<()> {
    let field = result.require_scalar_field(M3C2_DISTANCE)?;
    let max = field.max().ok_or_else(|| empty_field(field))?;
    let min = field.min().ok_or_else(|| empty_field(field))?;

    ensure_close("max M3C2 distance", max as f64, expected_max, rel_tol)?;
    ensure_close("min M3C2 distance", min as f64, expected_min, rel_tol)
}

/// Check the mean of the distance uncertainty field
pub fn check_mean_uncertainty(result: &PointCloud, expected_mean: f64, rel_tol: f64) -> Result<()> {
    let field = result.require_scalar_field(DISTANCE_UNCERTAINTY)?;
    let (mean, _variance) = field.mean_and_variance().ok_or_else(|| empty_field(field))?;
    ensure_close("mean distance uncertainty", mean, expected_mean, rel_tol)
}
