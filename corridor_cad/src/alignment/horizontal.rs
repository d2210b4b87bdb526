//! Exact plan geometry of a discretized alignment.
//!
//! The discretizer emits chords; stations are measured on these elements
//! instead, so a station maps to the same place whatever the subdivision
//! policy.

use serde::{Deserialize, Serialize};

use super::discretizer::arc_point;
use super::spiral::{place, spiral_local};
use super::station::ContinuousCurve;
use crate::geometry::{distance, Point, Point3};

/// Individual elements of a horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HorizontalElement {
    /// Straight tangent between two points.
    Tangent { start: Point, end: Point },
    /// Circular arc leaving `start` on `bearing`; `direction` is +1 for a
    /// right turn.
    Curve {
        start: Point,
        bearing: f64,
        radius: f64,
        direction: f64,
        central_angle: f64,
    },
    /// Clothoid transition placed from `origin`, the end with infinite
    /// radius. An exit spiral is walked from its CS back to that origin.
    Spiral {
        origin: Point,
        bearing: f64,
        radius: f64,
        direction: f64,
        spiral_length: f64,
        exit: bool,
    },
}

impl HorizontalElement {
    pub fn length(&self) -> f64 {
        match *self {
            HorizontalElement::Tangent { start, end } => distance(start, end),
            HorizontalElement::Curve {
                radius,
                central_angle,
                ..
            } => radius * central_angle,
            HorizontalElement::Spiral { spiral_length, .. } => spiral_length,
        }
    }

    /// Point `s` along the element from its start.
    pub fn point_at(&self, s: f64) -> Point {
        match *self {
            HorizontalElement::Tangent { start, end } => {
                let len = distance(start, end);
                let t = if len.abs() < f64::EPSILON { 0.0 } else { s / len };
                start + (end - start) * t
            }
            HorizontalElement::Curve {
                start,
                bearing,
                radius,
                direction,
                ..
            } => arc_point(start, bearing, radius, direction, s / radius),
            HorizontalElement::Spiral {
                origin,
                bearing,
                radius,
                direction,
                spiral_length,
                exit,
            } => {
                let l = if exit { spiral_length - s } else { s };
                place(origin, bearing, direction, spiral_local(l, spiral_length, radius))
            }
        }
    }

    fn end_point(&self) -> Point {
        self.point_at(self.length())
    }

    /// Shifts the element by `delta`.
    pub fn translate(&mut self, delta: Point) {
        match self {
            HorizontalElement::Tangent { start, end } => {
                *start = *start + delta;
                *end = *end + delta;
            }
            HorizontalElement::Curve { start, .. } => *start = *start + delta,
            HorizontalElement::Spiral { origin, .. } => *origin = *origin + delta,
        }
    }
}

/// Horizontal alignment consisting of tangent, curve and spiral elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HorizontalAlignment {
    pub elements: Vec<HorizontalElement>,
}

impl HorizontalAlignment {
    pub fn new(elements: Vec<HorizontalElement>) -> Self {
        Self { elements }
    }

    /// Total length of the alignment.
    pub fn length(&self) -> f64 {
        self.elements.iter().map(|e| e.length()).sum()
    }

    /// Position `dist` along the alignment, `None` outside `0..=length`.
    pub fn point_at(&self, dist: f64) -> Option<Point> {
        if dist < 0.0 {
            return None;
        }
        let mut remaining = dist;
        for elem in &self.elements {
            let len = elem.length();
            if remaining <= len {
                return Some(elem.point_at(remaining));
            }
            remaining -= len;
        }
        // Accumulated rounding can leave a sliver past the last element.
        if remaining <= 1e-9 {
            return self.elements.last().map(|e| e.end_point());
        }
        None
    }

    pub fn translate(&mut self, delta: Point) {
        for e in &mut self.elements {
            e.translate(delta);
        }
    }
}

impl ContinuousCurve for HorizontalAlignment {
    fn length(&self) -> f64 {
        HorizontalAlignment::length(self)
    }

    fn point_at_distance(&self, distance: f64) -> Option<Point3> {
        self.point_at(distance).map(Point3::from)
    }
}
