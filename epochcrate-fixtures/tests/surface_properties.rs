//! Property checks for the synthetic surface generator
//!
//! These tests exercise the generator through its public API with several
//! seeds and configurations and verify the invariants every fixture must hold.

use epochcrate_core::{radial_distance, DisplacementChannel, PointCloud};
use epochcrate_fixtures::*;
use rand::prelude::*;

/// Absolute slack for values rounded to f32 on storage
const F32_SLACK: f64 = 1e-5;

fn configs() -> Vec<GenerationConfig> {
    vec![
        GenerationConfig::epoch1().with_point_count(5_000),
        GenerationConfig::epoch2().with_point_count(5_000),
        GenerationConfig {
            name: "wide".to_string(),
            point_count: 3_000,
            domain_half_width: 12.5,
            vertical_offset: -1.5,
            noise_scale_factor: 0.05,
        },
    ]
}

fn uz(cloud: &PointCloud) -> &[f32] {
    cloud.displacement(DisplacementChannel::Uz).unwrap().values()
}

#[test]
fn test_every_array_has_point_count_entries() {
    for (seed, config) in configs().iter().enumerate() {
        let cloud = SyntheticSurfaceGenerator::generate_seeded(config, seed as u64).unwrap();
        assert_eq!(cloud.len(), config.point_count);
        assert_eq!(cloud.scalar_field_count(), 3);
        for sf in cloud.scalar_fields() {
            assert_eq!(sf.len(), config.point_count, "field {} has wrong length", sf.name());
        }
    }
}

#[test]
fn test_uncertainty_is_bounded_by_domain_corner() {
    for (seed, config) in configs().iter().enumerate() {
        let cloud = SyntheticSurfaceGenerator::generate_seeded(config, 100 + seed as u64).unwrap();
        let bound = config.max_uncertainty() + F32_SLACK;
        for &u in uz(&cloud) {
            assert!(u >= 0.0, "uncertainty must be non-negative, got {}", u);
            assert!((u as f64) <= bound, "uncertainty {} exceeds {}", u, bound);
        }
    }
}

#[test]
fn test_uncertainty_matches_noise_model() {
    let config = GenerationConfig::epoch2().with_point_count(2_000);
    let cloud = SyntheticSurfaceGenerator::generate_seeded(&config, 9).unwrap();
    for (p, &u) in cloud.iter().zip(uz(&cloud)) {
        let expected = config.noise_scale_factor as f64 * radial_distance(p);
        assert!((u as f64 - expected).abs() <= F32_SLACK);
    }
}

#[test]
fn test_noise_stays_within_uncertainty() {
    for (seed, config) in configs().iter().enumerate() {
        let cloud = SyntheticSurfaceGenerator::generate_seeded(config, 200 + seed as u64).unwrap();
        for (p, &u) in cloud.iter().zip(uz(&cloud)) {
            let f = radial_distance(p);
            let base = surface_height(f) + config.vertical_offset as f64;
            let deviation = (p.z as f64 - base).abs();
            assert!(
                deviation <= u as f64 + F32_SLACK,
                "point {:?} deviates by {} with uncertainty {}",
                p,
                deviation,
                u
            );
        }
    }
}

#[test]
fn test_same_seed_same_cloud() {
    let config = GenerationConfig::epoch1().with_point_count(10_000);
    let mut rng_a = StdRng::seed_from_u64(1234);
    let mut rng_b = StdRng::seed_from_u64(1234);
    let a = SyntheticSurfaceGenerator::generate(&config, &mut rng_a).unwrap();
    let b = SyntheticSurfaceGenerator::generate(&config, &mut rng_b).unwrap();
    assert_eq!(a, b);

    let c = SyntheticSurfaceGenerator::generate_seeded(&config, 4321).unwrap();
    assert_ne!(a.points(), c.points());
}

#[test]
fn test_noise_is_centered() {
    let config = GenerationConfig::epoch2().with_point_count(50_000);
    let cloud = SyntheticSurfaceGenerator::generate_seeded(&config, 77).unwrap();
    let mean_residual = cloud
        .iter()
        .map(|p| p.z as f64 - surface_height(radial_distance(p)) - config.vertical_offset as f64)
        .sum::<f64>()
        / cloud.len() as f64;
    // residuals are uniform in [-u, u] with u <= 0.0708
    assert!(mean_residual.abs() < 2e-3, "mean residual {}", mean_residual);
}

#[test]
fn test_reference_epoch_scenario() {
    let config = GenerationConfig {
        name: "epoch1".to_string(),
        point_count: 1_000_000,
        domain_half_width: 5.0,
        vertical_offset: 0.0,
        noise_scale_factor: 0.005,
    };
    let cloud = SyntheticSurfaceGenerator::generate_seeded(&config, 2021).unwrap();

    assert_eq!(cloud.len(), 1_000_000);
    assert!(cloud.iter().all(|p| (-5.0f32..=5.0).contains(&p.x) && (-5.0f32..=5.0).contains(&p.y)));

    let max_uz = uz(&cloud).iter().copied().fold(0.0f32, f32::max) as f64;
    assert!(max_uz <= 0.005 * 5.0 * std::f64::consts::SQRT_2 + F32_SLACK);
    // a million uniform samples reach close to the corners
    assert!(max_uz > 0.03, "max uncertainty {}", max_uz);
}

#[test]
fn test_epoch_pair_offsets_differ_by_vertical_offset() {
    let first = GenerationConfig::epoch1().with_point_count(20_000);
    let second = GenerationConfig::epoch2().with_point_count(20_000);
    let (e1, e2) = SyntheticSurfaceGenerator::generate_epoch_pair(&first, &second, 5).unwrap();

    let mean_offset = |cloud: &PointCloud| {
        cloud
            .iter()
            .map(|p| p.z as f64 - surface_height(radial_distance(p)))
            .sum::<f64>()
            / cloud.len() as f64
    };

    let shift = mean_offset(&e2) - mean_offset(&e1);
    assert!((shift - 0.2).abs() < 5e-3, "epochs shifted by {}", shift);
    assert_eq!(e1.name(), "epoch1");
    assert_eq!(e2.name(), "epoch2");
}
