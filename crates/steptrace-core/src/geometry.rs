//! Points and point clouds in millimeters

use serde::{Deserialize, Serialize};
use std::ops::Sub;

use crate::error::InputError;
use crate::event::MotionAxis;

/// A point in 3D space (millimeters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin (0, 0, 0)
    pub fn origin() -> Self {
        Self::default()
    }

    /// Component on a motion axis
    pub fn get(&self, axis: MotionAxis) -> f64 {
        match axis {
            MotionAxis::X => self.x,
            MotionAxis::Y => self.y,
            MotionAxis::Z => self.z,
        }
    }

    /// Mutable component on a motion axis
    pub fn get_mut(&mut self, axis: MotionAxis) -> &mut f64 {
        match axis {
            MotionAxis::X => &mut self.x,
            MotionAxis::Y => &mut self.y,
            MotionAxis::Z => &mut self.z,
        }
    }

    /// Euclidean length
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point3) -> f64 {
        (*other - *self).norm()
    }

    /// First non-finite component, if any
    pub fn first_non_finite(&self) -> Option<(MotionAxis, f64)> {
        MotionAxis::ALL
            .into_iter()
            .map(|axis| (axis, self.get(axis)))
            .find(|(_, value)| !value.is_finite())
    }

    pub fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }
}

impl Sub for Point3 {
    type Output = Point3;

    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<(f64, f64, f64)> for Point3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(x, y, z)
    }
}

/// Ordered sequence of positions sampled while extruding
///
/// A time series, not a set: consecutive identical points are legal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointCloud {
    points: Vec<Point3>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, point: Point3) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point3> {
        self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point3> {
        self.points.iter()
    }

    pub fn first(&self) -> Option<&Point3> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point3> {
        self.points.last()
    }

    /// Consecutive (previous, next) point pairs
    pub fn pairs(&self) -> impl Iterator<Item = (&Point3, &Point3)> {
        self.points.windows(2).map(|w| (&w[0], &w[1]))
    }

    /// Reject the cloud if any coordinate is NaN or infinite
    pub fn ensure_finite(&self) -> Result<(), InputError> {
        for (index, point) in self.points.iter().enumerate() {
            if let Some((axis, value)) = point.first_non_finite() {
                return Err(InputError::NonFiniteCoordinate {
                    index,
                    axis: axis.axis(),
                    value,
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<Point3>> for PointCloud {
    fn from(points: Vec<Point3>) -> Self {
        Self { points }
    }
}

impl FromIterator<Point3> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point3>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a Point3;
    type IntoIter = std::slice::Iter<'a, Point3>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
