//! Point types and related functionality

use nalgebra::Point3;

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// Radial distance of a point from the vertical axis, `sqrt(x² + y²)`
pub fn radial_distance(point: &Point3f) -> f64 {
    let x = point.x as f64;
    let y = point.y as f64;
    (x * x + y * y).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_radial_distance_ignores_z() {
        assert_relative_eq!(radial_distance(&Point3f::new(3.0, 4.0, 100.0)), 5.0);
        assert_relative_eq!(radial_distance(&Point3f::origin()), 0.0);
    }
}
