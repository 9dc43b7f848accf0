//! epochcrate: generate synthetic M3C2 epochs and parameter files.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=epochcrate_fixtures=debug` - Generation progress
//! - `RUST_LOG=epochcrate_m3c2=debug` - Parameter files and experiment checks
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Summarise the reference epoch pair and write its parameter file
//! epochcrate generate --seed 7 --params-dir data/
//!
//! # Print the default parameter file
//! epochcrate params
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use epochcrate_core::{radial_distance, Bounded, DisplacementChannel, PointCloud};
use epochcrate_fixtures::{surface_height, GenerationConfig, SyntheticSurfaceGenerator};
use epochcrate_m3c2::{
    run_uncertainty_experiment, EpochPair, ExperimentOutcome, M3C2Params, UncertaintyExperiment,
    UnavailableEngine,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// epochcrate - synthetic two-epoch point clouds for M3C2 comparison.
#[derive(Parser)]
#[command(name = "epochcrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the reference epoch pair and print its statistics
    Generate {
        /// Points per epoch
        #[arg(long, short = 'n', default_value_t = epochcrate_fixtures::REFERENCE_POINT_COUNT)]
        points: usize,

        /// Seed of the first epoch; the second uses seed + 1
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Half width of the square sampling domain
        #[arg(long, default_value_t = 5.0)]
        half_width: f32,

        /// Vertical offset of the second epoch
        #[arg(long, default_value_t = 0.2)]
        offset: f32,

        /// Directory receiving the parameter file of the uncertainty experiment
        #[arg(long)]
        params_dir: Option<PathBuf>,
    },

    /// Write or check an M3C2 parameter file
    Params {
        /// Write the default parameters here instead of stdout
        #[arg(short, long, conflicts_with = "check")]
        output: Option<PathBuf>,

        /// Parse and validate an existing parameter file
        #[arg(long)]
        check: Option<PathBuf>,
    },
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "epochcrate_fixtures=info,epochcrate_m3c2=info,epochcrate=info",
            2 => "epochcrate_fixtures=debug,epochcrate_m3c2=debug,epochcrate=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn print_summary(cloud: &PointCloud, config: &GenerationConfig) {
    let (min, max) = cloud.bounding_box();
    let uz = cloud.displacement(DisplacementChannel::Uz);
    let (mean_u, _) = uz.and_then(|sf| sf.mean_and_variance()).unwrap_or((0.0, 0.0));
    let max_u = uz.and_then(|sf| sf.max()).unwrap_or(0.0);
    let mean_offset = cloud
        .iter()
        .map(|p| p.z as f64 - surface_height(radial_distance(p)))
        .sum::<f64>()
        / cloud.len() as f64;

    println!("{}", cloud.name());
    println!("  points:            {}", cloud.len());
    println!(
        "  scalar fields:     {}",
        cloud.scalar_field_names().collect::<Vec<_>>().join(", ")
    );
    println!(
        "  bounds:            [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
        min.x, min.y, min.z, max.x, max.y, max.z
    );
    let center = cloud.center();
    println!(
        "  center:            [{:.3}, {:.3}, {:.3}]",
        center.x, center.y, center.z
    );
    println!(
        "  mean offset:       {:.4} (configured {})",
        mean_offset, config.vertical_offset
    );
    println!(
        "  uncertainty:       mean {:.5}, max {:.5} (bound {:.5})",
        mean_u,
        max_u,
        config.max_uncertainty()
    );
}

/// Write the uncertainty experiment's parameters when the backend could not run it.
///
/// Returns the written path, or `None` when no parameter directory was requested.
fn write_fallback_params(
    requested: bool,
    experiment: &UncertaintyExperiment,
) -> Result<Option<PathBuf>> {
    if !requested {
        return Ok(None);
    }

    let params = M3C2Params {
        use_precision_maps: true,
        pm1_scale: experiment.scales[0],
        pm2_scale: experiment.scales[1],
        ..Default::default()
    };
    let path = &experiment.params_path;
    params
        .write_to_file(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(Some(path.clone()))
}

fn generate(
    points: usize,
    seed: u64,
    half_width: f32,
    offset: f32,
    params_dir: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let first = GenerationConfig {
        domain_half_width: half_width,
        ..GenerationConfig::epoch1().with_point_count(points)
    };
    let second = GenerationConfig {
        domain_half_width: half_width,
        vertical_offset: offset,
        ..GenerationConfig::epoch2().with_point_count(points)
    };

    let (e1, e2) = SyntheticSurfaceGenerator::generate_epoch_pair(&first, &second, seed)
        .context("Failed to generate epochs")?;

    if !quiet {
        print_summary(&e1, &first);
        print_summary(&e2, &second);
    }

    // without --params-dir nothing is written, so any directory will do
    let experiment = UncertaintyExperiment::in_dir(params_dir.clone().unwrap_or_default());
    let epochs = EpochPair::new(&e1, &e2);
    let outcome = run_uncertainty_experiment(&UnavailableEngine, epochs, &experiment)
        .context("Uncertainty experiment failed")?;

    match outcome {
        ExperimentOutcome::Skipped { engine } => {
            info!(engine = %engine, "no comparison backend");
            let written = write_fallback_params(params_dir.is_some(), &experiment)?;
            if !quiet {
                println!("M3C2 backend '{}' unavailable, comparison skipped", engine);
                if let Some(path) = written {
                    println!("parameters written to {}", path.display());
                }
            }
        }
        ExperimentOutcome::Completed { result, params_path } => {
            if !quiet {
                println!(
                    "comparison produced {} core points, parameters in {}",
                    result.len(),
                    params_path.display()
                );
            }
        }
    }

    Ok(())
}

fn params(output: Option<PathBuf>, check: Option<PathBuf>, quiet: bool) -> Result<()> {
    if let Some(path) = check {
        let params = M3C2Params::read_from_file(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        params
            .validate()
            .with_context(|| format!("Invalid parameters in {}", path.display()))?;
        if !quiet {
            println!("{} is valid", path.display());
            for (key, value) in params.entries() {
                println!("  {}={}", key, value);
            }
        }
        return Ok(());
    }

    let params = M3C2Params::default();
    match output {
        Some(path) => {
            params
                .write_to_file(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !quiet {
                println!("parameters written to {}", path.display());
            }
        }
        None => print!("{}", params.to_ini_string()),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Generate {
            points,
            seed,
            half_width,
            offset,
            params_dir,
        } => generate(points, seed, half_width, offset, params_dir, cli.quiet),
        Commands::Params { output, check } => params(output, check, cli.quiet),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_params_need_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let experiment = UncertaintyExperiment::in_dir(dir.path());

        assert!(write_fallback_params(false, &experiment).unwrap().is_none());
        assert!(!experiment.params_path.exists());

        let written = write_fallback_params(true, &experiment).unwrap().unwrap();
        assert_eq!(written, experiment.params_path);
        let params = M3C2Params::read_from_file(&written).unwrap();
        assert!(params.use_precision_maps);
        assert_eq!(params.pm2_scale, 1.0);
    }

    #[test]
    fn test_cli_parses_generate_without_params_dir() {
        let cli = Cli::try_parse_from(["epochcrate", "generate", "-n", "10"]).unwrap();
        match cli.command {
            Commands::Generate { points, params_dir, .. } => {
                assert_eq!(points, 10);
                assert!(params_dir.is_none());
            }
            Commands::Params { .. } => panic!("expected generate"),
        }
    }
}
