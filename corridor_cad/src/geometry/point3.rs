//! Basic 3D point type used throughout the crate.

use std::ops::{Add, Sub};

use super::Point;

/// Representation of a 3D point. Also used for placement deltas.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Plan position, dropping the elevation.
    pub fn xy(self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<Point> for Point3 {
    fn from(p: Point) -> Self {
        Point3::new(p.x, p.y, 0.0)
    }
}

impl Add for Point3 {
    type Output = Point3;

    fn add(self, rhs: Point3) -> Point3 {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Point3;

    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Calculates the Euclidean distance between two 3D points.
pub fn distance3(a: Point3, b: Point3) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2) + (b.z - a.z).powi(2)).sqrt()
}
