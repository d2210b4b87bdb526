//! Spiral-curve-spiral discretization using the cubic clothoid
//! approximation.
//!
//! Local spiral coordinates: `y` runs along the initial tangent and `x`
//! is the offset toward the centre of the curve.

use super::discretizer::{arc_point, arc_points, curve_tangent_length, heading, right_of};
use super::horizontal::HorizontalElement;
use crate::config::DiscretizeConfig;
use crate::error::{AlignmentError, Result};
use crate::geometry::{distance, Point, Point3};

/// Offset of a spiral of length `len` at distance `l` from its TS.
pub(crate) fn spiral_local(l: f64, len: f64, radius: f64) -> (f64, f64) {
    let x = l.powi(3) / (6.0 * radius * len);
    let y = l - l.powi(5) / (40.0 * radius.powi(2) * len.powi(2));
    (x, y)
}

/// Offsets `(X_c, Y_c)` of the SC from the TS.
pub fn spiral_offsets(spiral_length: f64, radius: f64) -> (f64, f64) {
    spiral_local(spiral_length, spiral_length, radius)
}

/// Position of the shifted curve centre relative to the TS: `k` along the
/// tangent and `p`, the shift of the circle away from it.
///
/// `k` and `p` are close to `L/2` and `L²/(24R)`.
pub fn spiral_shift(spiral_length: f64, radius: f64) -> (f64, f64) {
    let (xc, yc) = spiral_offsets(spiral_length, radius);
    let theta = spiral_length / (2.0 * radius);
    let k = yc - radius * theta.sin();
    let p = xc - radius * (1.0 - theta.cos());
    (k, p)
}

/// Places local spiral coordinates in plan.
pub(crate) fn place(origin: Point, bearing: f64, direction: f64, (x, y): (f64, f64)) -> Point {
    let f = heading(bearing);
    origin + f * y + right_of(f) * (direction * x)
}

/// Key points of a symmetric spiral-curve-spiral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralLayout {
    pub sc: Point,
    pub cs: Point,
    pub st: Point,
    pub sc_bearing: f64,
    /// Angle left for the circular arc between SC and CS.
    pub central_arc: f64,
}

/// A spiral-curve-spiral starting at its TS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralCurve {
    pub start: Point,
    pub bearing_in: f64,
    pub radius: f64,
    pub signed_angle: f64,
    pub spiral_length: f64,
}

impl SpiralCurve {
    pub fn new(start: Point, bearing_in: f64, radius: f64, signed_angle: f64, spiral_length: f64) -> Self {
        Self {
            start,
            bearing_in,
            radius,
            signed_angle,
            spiral_length,
        }
    }

    fn direction(&self) -> f64 {
        if self.signed_angle >= 0.0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Angle swept by each spiral leg.
    pub fn spiral_angle(&self) -> f64 {
        self.spiral_length / (2.0 * self.radius)
    }

    /// Distance from the TS to the PI, and from the PI to the ST.
    pub fn tangent_length(&self) -> f64 {
        curve_tangent_length(self.radius, self.signed_angle.abs(), self.spiral_length)
    }

    /// Closed-form key points, or `None` when the spirals consume the
    /// whole deflection.
    pub fn layout(&self) -> Option<SpiralLayout> {
        if self.radius <= 0.0 || self.spiral_length <= 0.0 {
            return None;
        }
        let dir = self.direction();
        let central_arc = self.signed_angle.abs() - 2.0 * self.spiral_angle();
        if central_arc <= 0.0 {
            return None;
        }
        let offsets = spiral_offsets(self.spiral_length, self.radius);
        let sc = place(self.start, self.bearing_in, dir, offsets);
        let sc_bearing = self.bearing_in + dir * self.spiral_angle();
        let cs = arc_point(sc, sc_bearing, self.radius, dir, central_arc);
        let t = self.tangent_length();
        let st = self.start + heading(self.bearing_in) * t + heading(self.bearing_in + self.signed_angle) * t;
        Some(SpiralLayout {
            sc,
            cs,
            st,
            sc_bearing,
            central_arc,
        })
    }

    /// Bearing of the exit tangent, walked backwards from the ST.
    fn reverse_exit_bearing(&self) -> f64 {
        self.bearing_in + self.signed_angle + std::f64::consts::PI
    }

    /// Entry spiral, central arc and exit spiral.
    pub fn elements(&self, layout: &SpiralLayout) -> [HorizontalElement; 3] {
        let dir = self.direction();
        [
            HorizontalElement::Spiral {
                origin: self.start,
                bearing: self.bearing_in,
                radius: self.radius,
                direction: dir,
                spiral_length: self.spiral_length,
                exit: false,
            },
            HorizontalElement::Curve {
                start: layout.sc,
                bearing: layout.sc_bearing,
                radius: self.radius,
                direction: dir,
                central_angle: layout.central_arc,
            },
            HorizontalElement::Spiral {
                origin: layout.st,
                bearing: self.reverse_exit_bearing(),
                radius: self.radius,
                direction: -dir,
                spiral_length: self.spiral_length,
                exit: true,
            },
        ]
    }
}

/// Points of `curve` after its TS, ending on the ST, each paired with its
/// distance from the TS.
pub(crate) fn discretize_spiral_local(curve: &SpiralCurve, config: &DiscretizeConfig) -> Result<Vec<(f64, Point)>> {
    let degenerate = || AlignmentError::DegenerateSpiralCurve {
        index: 0,
        radius: curve.radius,
        spiral_length: curve.spiral_length,
    };
    let layout = curve.layout().ok_or_else(degenerate)?;
    let dir = curve.direction();
    let (len, radius) = (curve.spiral_length, curve.radius);

    let arc = arc_points(layout.sc, layout.sc_bearing, radius, layout.central_arc, dir, config)?;
    // the central arc needs the SC plus at least one more point
    let Some(&(_, first)) = arc.first() else {
        return Err(degenerate());
    };

    let chord = distance(layout.sc, first);
    let segments = (len / chord).ceil().max(1.0);
    if !segments.is_finite() || segments > config.max_curve_points as f64 {
        return Err(AlignmentError::InvalidSubdivisionPolicy {
            index: 0,
            reason: format!("spiral of length {len} needs {segments} chords"),
        });
    }
    let n = segments as usize;
    let arc_length = radius * layout.central_arc;

    let mut pts = Vec::with_capacity(2 * n + arc.len());
    for k in 1..=n {
        let l = len * k as f64 / n as f64;
        pts.push((l, place(curve.start, curve.bearing_in, dir, spiral_local(l, len, radius))));
    }
    pts.extend(arc.iter().map(|&(s, p)| (len + s, p)));
    let rev = curve.reverse_exit_bearing();
    for k in (0..n).rev() {
        let l = len * k as f64 / n as f64;
        pts.push((
            2.0 * len + arc_length - l,
            place(layout.st, rev, -dir, spiral_local(l, len, radius)),
        ));
    }
    Ok(pts)
}

/// Discretizes a spiral-curve-spiral whose TS is `start`.
///
/// `signed_angle` is the total deflection, positive for a right turn. The
/// returned points exclude `start` and end on the ST.
pub fn discretize_spiral(
    start: Point3,
    bearing_in: f64,
    radius: f64,
    signed_angle: f64,
    spiral_length: f64,
    config: &DiscretizeConfig,
) -> Result<Vec<Point3>> {
    let curve = SpiralCurve::new(start.xy(), bearing_in, radius, signed_angle, spiral_length);
    let pts = discretize_spiral_local(&curve, config)?;
    Ok(pts.into_iter().map(|(_, p)| p.with_z(start.z)).collect())
}
