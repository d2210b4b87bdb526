//! Ordered point sequences produced by discretization.

use super::{distance3, Point3};

/// Representation of a series of connected 3D line segments.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Polyline3 {
    pub vertices: Vec<Point3>,
}

impl Polyline3 {
    /// Creates a new polyline from a list of vertices.
    pub fn new(vertices: Vec<Point3>) -> Self {
        Self { vertices }
    }

    /// Returns the total length of all segments in the polyline.
    pub fn length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|pair| distance3(pair[0], pair[1]))
            .sum()
    }

    /// Point located `dist` along the polyline from its first vertex.
    ///
    /// Returns `None` for an empty polyline or a distance outside
    /// `0..=length`.
    pub fn point_at_distance(&self, dist: f64) -> Option<Point3> {
        let first = *self.vertices.first()?;
        if dist < 0.0 {
            return None;
        }
        let mut remaining = dist;
        for pair in self.vertices.windows(2) {
            let len = distance3(pair[0], pair[1]);
            if remaining <= len {
                let t = if len.abs() < f64::EPSILON {
                    0.0
                } else {
                    remaining / len
                };
                return Some(Point3::new(
                    pair[0].x + t * (pair[1].x - pair[0].x),
                    pair[0].y + t * (pair[1].y - pair[0].y),
                    pair[0].z + t * (pair[1].z - pair[0].z),
                ));
            }
            remaining -= len;
        }
        if self.vertices.len() == 1 && remaining.abs() < f64::EPSILON {
            return Some(first);
        }
        // Accumulated rounding can leave a sliver past the last vertex.
        if remaining <= 1e-9 {
            return self.vertices.last().copied();
        }
        None
    }

    /// Shifts every vertex by `delta`.
    pub fn translate(&mut self, delta: Point3) {
        for v in &mut self.vertices {
            *v = *v + delta;
        }
    }
}
