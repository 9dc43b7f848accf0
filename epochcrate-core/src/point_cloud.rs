//! Point cloud data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use crate::scalar_field::{DisplacementChannel, ScalarField};
use serde::Serialize;
use std::ops::Index;

/// A named point cloud with per-point scalar fields.
///
/// Points are fixed at construction and every scalar field holds exactly one
/// value per point. Scalar fields keep their insertion order, so the index
/// returned by [`PointCloud::add_scalar_field`] stays valid for the lifetime
/// of the cloud. Clouds are only built through [`PointCloud::with_name`] and
/// [`PointCloud::add_scalar_field`], so the type is `Serialize` but not
/// `Deserialize`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointCloud {
    name: String,
    points: Vec<Point3f>,
    scalar_fields: Vec<ScalarField>,
}

impl PointCloud {
    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<Point3f>) -> Self {
        Self::with_name("", points)
    }

    /// Create a named point cloud from a vector of points
    pub fn with_name(name: impl Into<String>, points: Vec<Point3f>) -> Self {
        Self {
            name: name.into(),
            points,
            scalar_fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the points of the cloud
    pub fn points(&self) -> &[Point3f] {
        &self.points
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<'_, Point3f> {
        self.points.iter()
    }

    /// Attach a new scalar field and return its index.
    ///
    /// Fails if the field does not hold one value per point or if a field
    /// with the same name already exists.
    pub fn add_scalar_field(&mut self, name: impl Into<String>, values: Vec<f32>) -> Result<usize> {
        let name = name.into();
        if values.len() != self.points.len() {
            return Err(Error::InvalidData(format!(
                "scalar field '{}' has {} values but the cloud has {} points",
                name,
                values.len(),
                self.points.len()
            )));
        }
        if self.scalar_field_index(&name).is_some() {
            return Err(Error::InvalidData(format!(
                "scalar field '{}' already exists on cloud '{}'",
                name, self.name
            )));
        }

        self.scalar_fields.push(ScalarField::new(name, values));
        Ok(self.scalar_fields.len() - 1)
    }

    pub fn scalar_field_count(&self) -> usize {
        self.scalar_fields.len()
    }

    /// All scalar fields in insertion order
    pub fn scalar_fields(&self) -> &[ScalarField] {
        &self.scalar_fields
    }

    /// Scalar field names in insertion order
    pub fn scalar_field_names(&self) -> impl Iterator<Item = &str> {
        self.scalar_fields.iter().map(|sf| sf.name())
    }

    pub fn scalar_field(&self, index: usize) -> Option<&ScalarField> {
        self.scalar_fields.get(index)
    }

    pub fn scalar_field_index(&self, name: &str) -> Option<usize> {
        self.scalar_fields.iter().position(|sf| sf.name() == name)
    }

    pub fn scalar_field_by_name(&self, name: &str) -> Option<&ScalarField> {
        self.scalar_fields.iter().find(|sf| sf.name() == name)
    }

    /// Like [`PointCloud::scalar_field_by_name`], but missing fields are an error
    pub fn require_scalar_field(&self, name: &str) -> Result<&ScalarField> {
        self.scalar_field_by_name(name).ok_or_else(|| {
            Error::MissingScalarField(format!("'{}' on cloud '{}'", name, self.name))
        })
    }

    /// Look up a displacement channel.
    ///
    /// The channel's fixed index is tried first; clouds that were not built
    /// with the standard channel layout fall back to a lookup by name.
    pub fn displacement(&self, channel: DisplacementChannel) -> Option<&ScalarField> {
        match self.scalar_fields.get(channel.index()) {
            Some(sf) if sf.name() == channel.name() => Some(sf),
            _ => self.scalar_field_by_name(channel.name()),
        }
    }
}

impl Index<usize> for PointCloud {
    type Output = Point3f;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a Point3f;
    type IntoIter = std::slice::Iter<'a, Point3f>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl FromIterator<Point3f> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point3f>>(iter: I) -> Self {
        Self::from_points(Vec::from_iter(iter))
    }
}
