//! Named per-point scalar channels

use serde::{Deserialize, Serialize};

/// A named per-point numeric channel attached to a point cloud
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarField {
    name: String,
    values: Vec<f32>,
}

impl ScalarField {
    /// Create a scalar field from a name and its values
    pub fn new(name: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest value, `None` for an empty field
    pub fn min(&self) -> Option<f32> {
        self.values.iter().copied().reduce(f32::min)
    }

    /// Largest value, `None` for an empty field
    pub fn max(&self) -> Option<f32> {
        self.values.iter().copied().reduce(f32::max)
    }

    /// Mean and population variance, accumulated in f64
    pub fn mean_and_variance(&self) -> Option<(f64, f64)> {
        if self.values.is_empty() {
            return None;
        }

        let n = self.values.len() as f64;
        let mean = self.values.iter().map(|&v| v as f64).sum::<f64>() / n;
        let variance = self
            .values
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        Some((mean, variance))
    }
}

/// The per-point displacement channels carried by every generated epoch.
///
/// Clouds built by the fixture generator create these fields first and in
/// this order, so `index()` is also the scalar field index in such a cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplacementChannel {
    Ux,
    Uy,
    Uz,
}

impl DisplacementChannel {
    pub const ALL: [DisplacementChannel; 3] = [
        DisplacementChannel::Ux,
        DisplacementChannel::Uy,
        DisplacementChannel::Uz,
    ];

    /// Scalar field name of the channel
    pub fn name(&self) -> &'static str {
        match self {
            DisplacementChannel::Ux => "ux",
            DisplacementChannel::Uy => "uy",
            DisplacementChannel::Uz => "uz",
        }
    }

    /// Position of the channel in a generated cloud's scalar fields
    pub fn index(&self) -> usize {
        match self {
            DisplacementChannel::Ux => 0,
            DisplacementChannel::Uy => 1,
            DisplacementChannel::Uz => 2,
        }
    }
}
