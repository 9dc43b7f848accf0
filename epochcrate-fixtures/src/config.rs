//! Generation parameters for synthetic epochs

use epochcrate_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of points in each epoch of the reference experiment
pub const REFERENCE_POINT_COUNT: usize = 1_000_000;

/// Parameters of one synthetic epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Name given to the generated cloud
    pub name: String,
    /// Number of points to sample
    pub point_count: usize,
    /// x and y are drawn from `[-domain_half_width, domain_half_width]`
    pub domain_half_width: f32,
    /// Constant added to every height
    pub vertical_offset: f32,
    /// Uncertainty per unit of radius
    pub noise_scale_factor: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            name: "epoch".to_string(),
            point_count: REFERENCE_POINT_COUNT,
            domain_half_width: 5.0,
            vertical_offset: 0.0,
            noise_scale_factor: 0.005,
        }
    }
}

impl GenerationConfig {
    /// First epoch of the reference experiment: no offset, noise factor 0.005
    pub fn epoch1() -> Self {
        Self {
            name: "epoch1".to_string(),
            ..Self::default()
        }
    }

    /// Second epoch of the reference experiment: raised by 0.2, noise factor 0.01
    pub fn epoch2() -> Self {
        Self {
            name: "epoch2".to_string(),
            vertical_offset: 0.2,
            noise_scale_factor: 0.01,
            ..Self::default()
        }
    }

    pub fn with_point_count(mut self, point_count: usize) -> Self {
        self.point_count = point_count;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Largest uncertainty the generator can produce, reached at the domain corners
    pub fn max_uncertainty(&self) -> f64 {
        self.noise_scale_factor as f64 * std::f64::consts::SQRT_2 * self.domain_half_width as f64
    }

    /// Check the parameters before generation
    pub fn validate(&self) -> Result<()> {
        if self.point_count == 0 {
            return Err(Error::InvalidConfig("point count must be positive".to_string()));
        }
        if !self.domain_half_width.is_finite() || self.domain_half_width <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "domain half width must be finite and positive, got {}",
                self.domain_half_width
            )));
        }
        if !self.vertical_offset.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "vertical offset must be finite, got {}",
                self.vertical_offset
            )));
        }
        if !self.noise_scale_factor.is_finite() || self.noise_scale_factor < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "noise scale factor must be finite and non-negative, got {}",
                self.noise_scale_factor
            )));
        }

        // |sin(3f) / (f + eps)| < 3, so this bounds every stored height
        let height_bound = self.vertical_offset.abs() as f64 + 3.0 + self.max_uncertainty();
        if height_bound > f32::MAX as f64 {
            return Err(Error::InvalidConfig(format!(
                "heights up to {:e} do not fit in f32 (offset {}, noise factor {}, half width {})",
                height_bound, self.vertical_offset, self.noise_scale_factor, self.domain_half_width
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_presets() {
        let e1 = GenerationConfig::epoch1();
        let e2 = GenerationConfig::epoch2();
        assert_eq!(e1.point_count, 1_000_000);
        assert_eq!(e1.vertical_offset, 0.0);
        assert_eq!(e1.noise_scale_factor, 0.005);
        assert_eq!(e2.vertical_offset, 0.2);
        assert_eq!(e2.noise_scale_factor, 0.01);
        assert_eq!(e2.domain_half_width, 5.0);
        assert!(e1.validate().is_ok());
        assert!(e2.validate().is_ok());
    }

    #[test]
    fn test_max_uncertainty() {
        let max_u = GenerationConfig::epoch1().max_uncertainty();
        assert_relative_eq!(max_u, 0.0353553, epsilon = 1e-6);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            GenerationConfig::default().with_point_count(0),
            GenerationConfig { domain_half_width: f32::NAN, ..Default::default() },
            GenerationConfig { domain_half_width: 0.0, ..Default::default() },
            GenerationConfig { vertical_offset: f32::INFINITY, ..Default::default() },
            GenerationConfig { noise_scale_factor: -0.1, ..Default::default() },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(Error::InvalidConfig(_))),
                "should reject {:?}",
                config
            );
        }
    }

    #[test]
    fn test_validate_rejects_heights_beyond_f32() {
        let noisy = GenerationConfig {
            domain_half_width: 100.0,
            noise_scale_factor: 1e37,
            ..Default::default()
        };
        assert!(matches!(noisy.validate(), Err(Error::InvalidConfig(_))));

        // each value is fine alone, the sum overflows
        let offset_and_noise = GenerationConfig {
            domain_half_width: 1e38,
            vertical_offset: -3.4e38,
            noise_scale_factor: 0.01,
            ..Default::default()
        };
        assert!(matches!(offset_and_noise.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_accepts_huge_domain() {
        let config = GenerationConfig {
            domain_half_width: 3e38,
            ..GenerationConfig::epoch1()
        };
        assert!(config.validate().is_ok());
    }
}
