//! Per-point precision maps handed to the engine

use crate::engine::EpochPair;
use epochcrate_core::{DisplacementChannel, Error, PointCloud, Result, ScalarField};

/// Displacement uncertainty channels of both epochs plus their scales.
#[derive(Debug, Clone)]
pub struct PrecisionMaps<'a> {
    /// `ux`, `uy`, `uz` of the reference epoch
    pub reference: [&'a ScalarField; 3],
    /// `ux`, `uy`, `uz` of the compared epoch
    pub compared: [&'a ScalarField; 3],
    /// Multiplier applied to each epoch's channels
    pub scales: [f64; 2],
}

fn channels(cloud: &PointCloud) -> Result<[&ScalarField; 3]> {
    let lookup = move |channel: DisplacementChannel| {
        cloud.displacement(channel).ok_or_else(|| {
            Error::MissingScalarField(format!("'{}' on cloud '{}'", channel.name(), cloud.name()))
        })
    };
    Ok([
        lookup(DisplacementChannel::Ux)?,
        lookup(DisplacementChannel::Uy)?,
        lookup(DisplacementChannel::Uz)?,
    ])
}

impl<'a> PrecisionMaps<'a> {
    /// Collect the displacement channels of both epochs
    pub fn from_epochs(epochs: EpochPair<'a>, scales: [f64; 2]) -> Result<Self> {
        if let Some(bad) = scales.iter().find(|s| !s.is_finite() || **s <= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "precision map scales must be finite and positive, got {}",
                bad
            )));
        }

        Ok(Self {
            reference: channels(epochs.reference)?,
            compared: channels(epochs.compared)?,
            scales,
        })
    }

    /// All six fields, reference epoch first
    pub fn fields(&self) -> impl Iterator<Item = &'a ScalarField> + '_ {
        self.reference.iter().chain(self.compared.iter()).copied()
    }
}
