//! Synthetic wavy radial surface
//!
//! Heights follow `sin(3f) / (f + 1e-6)` with `f = sqrt(x² + y²)`, so the
//! surface is smooth and doubly curved with a known maximum slope. Noise is
//! uniform in `[-u, u]` where `u = noise_scale_factor * f`.

use crate::config::GenerationConfig;
use epochcrate_core::{DisplacementChannel, Point3f, PointCloud, Result};
use rand::prelude::*;
use tracing::debug;

/// Guards the height function against the singularity at `f = 0`
pub const RADIAL_EPSILON: f64 = 1e-6;

/// Height of the noise-free surface at radial distance `f`
pub fn surface_height(f: f64) -> f64 {
    (3.0 * f).sin() / (f + RADIAL_EPSILON)
}

/// Builds synthetic epoch point clouds.
pub struct SyntheticSurfaceGenerator;

impl SyntheticSurfaceGenerator {
    /// Generate one epoch, drawing every sample from `rng`.
    ///
    /// The returned cloud carries the scalar fields `ux`, `uy` and `uz`, in
    /// that order. `ux` and `uy` are zero; `uz` holds the per-point
    /// uncertainty magnitude.
    pub fn generate<R: Rng + ?Sized>(config: &GenerationConfig, rng: &mut R) -> Result<PointCloud> {
        config.validate()?;

        let n = config.point_count;
        let h = config.domain_half_width as f64;
        let offset = config.vertical_offset as f64;
        let noise = config.noise_scale_factor as f64;

        debug!(
            name = %config.name,
            points = n,
            half_width = h,
            offset,
            noise,
            "generating synthetic epoch"
        );

        // 2h may not fit in f32, so draw in f64; rounding keeps x within [-h, h]
        let mut coordinate = || (-h + 2.0 * h * rng.gen::<f64>()) as f32;
        let xs: Vec<f32> = (0..n).map(|_| coordinate()).collect();
        let ys: Vec<f32> = (0..n).map(|_| coordinate()).collect();

        let mut points = Vec::with_capacity(n);
        let mut uncertainty = Vec::with_capacity(n);

        for (&x, &y) in xs.iter().zip(&ys) {
            let f = ((x as f64).powi(2) + (y as f64).powi(2)).sqrt();
            let u = noise * f;
            let z = surface_height(f) + offset + 2.0 * u * (0.5 - rng.gen::<f64>());

            points.push(Point3f::new(x, y, z as f32));
            uncertainty.push(u as f32);
        }

        let max_u = uncertainty.iter().copied().fold(0.0f32, f32::max);

        let mut cloud = PointCloud::with_name(config.name.clone(), points);
        for channel in DisplacementChannel::ALL {
            let values = match channel {
                DisplacementChannel::Uz => std::mem::take(&mut uncertainty),
                DisplacementChannel::Ux | DisplacementChannel::Uy => vec![0.0; n],
            };
            let index = cloud.add_scalar_field(channel.name(), values)?;
            debug_assert_eq!(index, channel.index());
        }

        debug!(
            name = %config.name,
            points = cloud.len(),
            max_uncertainty = max_u,
            "synthetic epoch ready"
        );
        Ok(cloud)
    }

    /// Generate one epoch from a seeded [`StdRng`]
    pub fn generate_seeded(config: &GenerationConfig, seed: u64) -> Result<PointCloud> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::generate(config, &mut rng)
    }

    /// Generate two epochs concurrently.
    ///
    /// `first` is drawn from a generator seeded with `seed` and `second` from
    /// one seeded with `seed + 1`, so the pair is reproducible and the two
    /// clouds are independent.
    pub fn generate_epoch_pair(
        first: &GenerationConfig,
        second: &GenerationConfig,
        seed: u64,
    ) -> Result<(PointCloud, PointCloud)> {
        let (a, b) = rayon::join(
            || Self::generate_seeded(first, seed),
            || Self::generate_seeded(second, seed.wrapping_add(1)),
        );
        Ok((a?, b?))
    }
}
