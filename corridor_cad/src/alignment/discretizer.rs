//! Converts canonical geometry elements into an ordered point sequence.

use log::{debug, warn};

use super::horizontal::{HorizontalAlignment, HorizontalElement};
use super::spiral::{discretize_spiral_local, spiral_shift, SpiralCurve};
use super::{Discretization, GeometryElement};
use crate::config::DiscretizeConfig;
use crate::error::{AlignmentError, Result};
use crate::geometry::{Point, Point3};
use crate::surveying::{deflection, forward};

/// Deflections smaller than this are treated as a straight continuation.
const MIN_CENTRAL_ANGLE: f64 = 1e-9;

/// A trailing partial chord shorter than this (in arc length) is dropped.
const MIN_REMAINDER_ARC: f64 = 0.0001;

/// Straight runs at or below this length never produce a vertex.
const MIN_STRAIGHT: f64 = 1e-9;

/// Unit vector along a compass bearing.
pub(crate) fn heading(bearing: f64) -> Point {
    Point::new(bearing.sin(), bearing.cos())
}

/// Unit vector 90° clockwise of `f`.
pub(crate) fn right_of(f: Point) -> Point {
    Point::new(f.y, -f.x)
}

/// Point at deflection `delta` along an arc starting at `start` heading
/// `bearing`; `direction` is +1 for a right turn, -1 for a left turn.
pub(crate) fn arc_point(start: Point, bearing: f64, radius: f64, direction: f64, delta: f64) -> Point {
    let f = heading(bearing);
    let r = right_of(f);
    start + (f * delta.sin() + r * (direction * (1.0 - delta.cos()))) * radius
}

/// Tangent length from PI to PC (or TS) for a curve of `central_angle`.
///
/// For a spiraled curve this is `k + (R + p)·tan(Δ/2)` with the shift
/// from [`spiral_shift`], which keeps both spirals on their tangents.
pub fn curve_tangent_length(radius: f64, central_angle: f64, spiral_length: f64) -> f64 {
    if radius <= 0.0 {
        return 0.0;
    }
    let half = (central_angle / 2.0).tan();
    if spiral_length > 0.0 {
        let (k, p) = spiral_shift(spiral_length, radius);
        k + (radius + p) * half
    } else {
        radius * half
    }
}

/// Chord points of a circular arc, excluding `start` and ending at the PT,
/// each paired with its arc length from `start`.
pub(crate) fn arc_points(
    start: Point,
    bearing: f64,
    radius: f64,
    central_angle: f64,
    direction: f64,
    config: &DiscretizeConfig,
) -> Result<Vec<(f64, Point)>> {
    if central_angle <= 0.0 {
        return Ok(Vec::new());
    }
    let increment = config.policy.angle_increment(radius, central_angle);
    if !increment.is_finite() || increment <= 0.0 {
        return Err(AlignmentError::InvalidSubdivisionPolicy {
            index: 0,
            reason: format!("{:?} gives angle step {increment} on radius {radius}", config.policy),
        });
    }
    let steps = (central_angle / increment + 1e-9).floor();
    if steps > config.max_curve_points as f64 {
        return Err(AlignmentError::InvalidSubdivisionPolicy {
            index: 0,
            reason: format!(
                "{:?} needs {steps} points, limit is {}",
                config.policy, config.max_curve_points
            ),
        });
    }
    let steps = steps as usize;
    let mut pts: Vec<(f64, Point)> = (1..=steps)
        .map(|k| {
            let delta = k as f64 * increment;
            (delta * radius, arc_point(start, bearing, radius, direction, delta))
        })
        .collect();
    let remainder = central_angle - steps as f64 * increment;
    if remainder * radius > MIN_REMAINDER_ARC {
        pts.push((
            central_angle * radius,
            arc_point(start, bearing, radius, direction, central_angle),
        ));
    }
    Ok(pts)
}

/// Curve at one PI, laid out relative to its PC.
struct CurvePlan {
    tangent: f64,
    /// Chord points paired with their distance from the PC.
    points: Vec<(f64, Point)>,
    /// Exact geometry from PC to PT.
    elements: Vec<HorizontalElement>,
    /// PT relative to PC.
    end: Point,
}

impl CurvePlan {
    fn length(&self) -> f64 {
        self.elements.iter().map(|e| e.length()).sum()
    }
}

fn circular_plan(
    index: usize,
    elem: &GeometryElement,
    central: f64,
    direction: f64,
    config: &DiscretizeConfig,
    errors: &mut Vec<AlignmentError>,
) -> CurvePlan {
    let origin = Point::default();
    let end = arc_point(origin, elem.bearing_in, elem.radius, direction, central);
    let points = match arc_points(origin, elem.bearing_in, elem.radius, central, direction, config) {
        Ok(p) => p,
        Err(e) => {
            let e = e.at_element(index);
            warn!("curve contributes no points: {e}");
            errors.push(e);
            Vec::new()
        }
    };
    CurvePlan {
        tangent: curve_tangent_length(elem.radius, central, 0.0),
        points,
        elements: vec![HorizontalElement::Curve {
            start: origin,
            bearing: elem.bearing_in,
            radius: elem.radius,
            direction,
            central_angle: central,
        }],
        end,
    }
}

fn spiral_plan(
    index: usize,
    elem: &GeometryElement,
    central: f64,
    direction: f64,
    config: &DiscretizeConfig,
    errors: &mut Vec<AlignmentError>,
) -> CurvePlan {
    let signed = direction * central;
    let curve = SpiralCurve::new(Point::default(), elem.bearing_in, elem.radius, signed, elem.spiral_length);
    let degenerate = |errors: &mut Vec<AlignmentError>| {
        let e = AlignmentError::DegenerateSpiralCurve {
            index,
            radius: elem.radius,
            spiral_length: elem.spiral_length,
        };
        warn!("{e}; using a simple circular curve instead");
        errors.push(e);
    };
    let Some(layout) = curve.layout() else {
        degenerate(errors);
        return circular_plan(index, elem, central, direction, config, errors);
    };
    let points = match discretize_spiral_local(&curve, config) {
        Ok(points) => points,
        Err(AlignmentError::DegenerateSpiralCurve { .. }) => {
            degenerate(errors);
            return circular_plan(index, elem, central, direction, config, errors);
        }
        Err(e) => {
            let e = e.at_element(index);
            warn!("spiral curve contributes no points: {e}");
            errors.push(e);
            Vec::new()
        }
    };
    CurvePlan {
        tangent: curve.tangent_length(),
        points,
        elements: curve.elements(&layout).to_vec(),
        end: layout.st,
    }
}

/// Discretizes `elements` into a polyline starting at the local origin.
///
/// Each element is paired with the next one (the last element is paired
/// with a copy of itself) to find the deflection at its PI. Alongside the
/// points the result carries the exact geometry they approximate and the
/// distance of every point along it.
pub fn discretize(elements: &[GeometryElement], config: &DiscretizeConfig) -> Discretization {
    let mut out = Discretization::default();
    let Some(last) = elements.last() else {
        return out;
    };
    let sentinel = GeometryElement {
        tangent_length_from_prev: 0.0,
        ..*last
    };

    let mut current = Point::default();
    let mut travelled = 0.0;
    let mut points = vec![current];
    let mut distances = vec![0.0];
    let mut path = Vec::new();
    let mut prev_tangent = 0.0;

    let padded = elements.iter().chain(std::iter::once(&sentinel));
    let nexts = elements.iter().skip(1).chain(std::iter::once(&sentinel));
    for (index, (elem, next)) in padded.zip(nexts).enumerate() {
        let turn = deflection(elem.bearing_in, next.bearing_in);
        let central = turn.abs();
        let direction = if turn >= 0.0 { 1.0 } else { -1.0 };

        let plan = if elem.radius > 0.0 && central > MIN_CENTRAL_ANGLE {
            Some(if elem.spiral_length > 0.0 {
                spiral_plan(index, elem, central, direction, config, &mut out.errors)
            } else {
                circular_plan(index, elem, central, direction, config, &mut out.errors)
            })
        } else {
            None
        };

        let curve_tangent = plan.as_ref().map_or(0.0, |p| p.tangent);
        let straight = elem.tangent_length_from_prev - curve_tangent - prev_tangent;
        if straight > 0.0 {
            let end = forward(current, elem.bearing_in, straight);
            path.push(HorizontalElement::Tangent { start: current, end });
            current = end;
            travelled += straight;
            if straight > MIN_STRAIGHT && straight >= config.min_tangent_length {
                points.push(current);
                distances.push(travelled);
            } else {
                debug!("element {index}: {straight:.4} tangent below minimum, no vertex");
            }
        } else if straight < -1e-6 {
            warn!("element {index}: curves overlap by {:.4}", -straight);
        }

        match plan {
            Some(plan) => {
                for &(d, p) in &plan.points {
                    points.push(current + p);
                    distances.push(travelled + d);
                }
                let length = plan.length();
                path.extend(plan.elements.into_iter().map(|mut e| {
                    e.translate(current);
                    e
                }));
                current = current + plan.end;
                travelled += length;
                prev_tangent = plan.tangent;
            }
            None => prev_tangent = 0.0,
        }
    }

    debug!("discretized {} elements into {} points", elements.len(), points.len());
    out.points = points.into_iter().map(Point3::from).collect();
    out.distances = distances;
    out.path = HorizontalAlignment::new(path);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubdivisionPolicy;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn elem(tangent: f64, bearing_deg: f64, radius: f64) -> GeometryElement {
        GeometryElement {
            tangent_length_from_prev: tangent,
            bearing_in: bearing_deg.to_radians(),
            radius,
            spiral_length: 0.0,
        }
    }

    #[test]
    fn arc_points_by_segment() {
        let cfg = DiscretizeConfig::with_policy(SubdivisionPolicy::Segment(4));
        let pts = arc_points(Point::default(), 0.0, 100.0, FRAC_PI_2, 1.0, &cfg).unwrap();
        assert_eq!(pts.len(), 4);
        let (s, end) = pts[3];
        assert!((s - 50.0 * PI).abs() < 1e-9);
        assert!((end.x - 100.0).abs() < 1e-9);
        assert!((end.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn arc_points_left_turn() {
        let cfg = DiscretizeConfig::with_policy(SubdivisionPolicy::Segment(2));
        let pts = arc_points(Point::default(), 0.0, 100.0, PI, -1.0, &cfg).unwrap();
        let (_, end) = *pts.last().unwrap();
        assert!((end.x + 200.0).abs() < 1e-9);
        assert!(end.y.abs() < 1e-9);
    }

    #[test]
    fn interval_appends_partial_chord() {
        let cfg = DiscretizeConfig::with_policy(SubdivisionPolicy::Interval(30.0));
        // arc length 100 -> three full chords plus a 10 unit remainder
        let pts = arc_points(Point::default(), 0.0, 100.0, 1.0, 1.0, &cfg).unwrap();
        assert_eq!(pts.len(), 4);
        let lengths: Vec<f64> = pts.iter().map(|&(s, _)| s).collect();
        for (got, want) in lengths.iter().zip([30.0, 60.0, 90.0, 100.0]) {
            assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
    }

    #[test]
    fn sub_precision_remainder_is_dropped() {
        let cfg = DiscretizeConfig::with_policy(SubdivisionPolicy::Interval(10.0));
        // remainder of 0.00005 arc length
        let pts = arc_points(Point::default(), 0.0, 100.0, 0.2000005, 1.0, &cfg).unwrap();
        assert_eq!(pts.len(), 2);
    }

    #[test]
    fn degenerate_policies_fail() {
        for policy in [
            SubdivisionPolicy::Segment(0),
            SubdivisionPolicy::Interval(0.0),
            SubdivisionPolicy::Interval(-5.0),
            SubdivisionPolicy::Tolerance(0.0),
            SubdivisionPolicy::Tolerance(500.0),
        ] {
            let cfg = DiscretizeConfig::with_policy(policy);
            let res = arc_points(Point::default(), 0.0, 100.0, 1.0, 1.0, &cfg);
            assert!(
                matches!(res, Err(AlignmentError::InvalidSubdivisionPolicy { .. })),
                "{policy:?}"
            );
        }
    }

    #[test]
    fn point_cap_is_enforced() {
        let cfg = DiscretizeConfig {
            policy: SubdivisionPolicy::Interval(0.001),
            max_curve_points: 100,
            ..DiscretizeConfig::default()
        };
        let res = arc_points(Point::default(), 0.0, 100.0, 1.0, 1.0, &cfg);
        assert!(matches!(res, Err(AlignmentError::InvalidSubdivisionPolicy { .. })));
    }

    #[test]
    fn angle_point_without_curve() {
        let els = [elem(0.0, 0.0, 0.0), elem(100.0, 0.0, 0.0), elem(100.0, 90.0, 0.0)];
        let d = discretize(&els, &DiscretizeConfig::default());
        assert_eq!(d.points.len(), 3);
        assert!((d.points[1].y - 100.0).abs() < 1e-9);
        assert!((d.points[2].x - 100.0).abs() < 1e-9);
        assert!((d.points[2].y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn compound_curves_skip_zero_tangent() {
        // two 45° curves whose tangents meet exactly
        let r = 100.0;
        let t = r * (PI / 8.0).tan();
        let els = [
            elem(0.0, 0.0, 0.0),
            elem(200.0, 0.0, r),
            elem(2.0 * t, 45.0, r),
            elem(200.0, 90.0, 0.0),
        ];
        let cfg = DiscretizeConfig::with_policy(SubdivisionPolicy::Segment(5));
        let d = discretize(&els, &cfg);
        assert!(d.errors.is_empty());
        // start, tangent end, 5 + 5 arc points, final PI
        assert_eq!(d.points.len(), 13);
        let end = d.points.last().unwrap();
        let pi2 = Point::new(2.0 * t * 45f64.to_radians().sin(), 200.0 + 2.0 * t * 45f64.to_radians().cos());
        assert!((end.x - (pi2.x + 200.0)).abs() < 1e-6);
        assert!((end.y - pi2.y).abs() < 1e-6);
    }

    #[test]
    fn zero_minimum_tangent_emits_no_duplicate_vertex() {
        let r = 100.0;
        let t = r * (PI / 8.0).tan();
        let els = [
            elem(0.0, 0.0, 0.0),
            elem(200.0, 0.0, r),
            elem(2.0 * t, 45.0, r),
            elem(200.0, 90.0, 0.0),
        ];
        let cfg = DiscretizeConfig {
            min_tangent_length: 0.0,
            ..DiscretizeConfig::with_policy(SubdivisionPolicy::Segment(5))
        };
        let d = discretize(&els, &cfg);
        assert_eq!(d.points.len(), 13);
        for pair in d.points.windows(2) {
            let gap = ((pair[1].x - pair[0].x).powi(2) + (pair[1].y - pair[0].y).powi(2)).sqrt();
            assert!(gap > 1e-9, "repeated vertex {:?}", pair[1]);
        }
    }

    #[test]
    fn distances_follow_the_exact_path() {
        let els = [elem(0.0, 0.0, 0.0), elem(500.0, 0.0, 300.0), elem(500.0, 90.0, 0.0)];
        let cfg = DiscretizeConfig::with_policy(SubdivisionPolicy::Segment(10));
        let d = discretize(&els, &cfg);
        let length = 400.0 + 150.0 * PI;
        assert_eq!(d.distances.len(), d.points.len());
        assert!((d.path.length() - length).abs() < 1e-9);
        assert!((d.distances[1] - 200.0).abs() < 1e-9);
        assert!((d.distances[11] - (200.0 + 150.0 * PI)).abs() < 1e-9);
        assert!((d.distances.last().unwrap() - length).abs() < 1e-9);
        // chords are shorter than the arcs they span
        let chorded: f64 = d
            .points
            .windows(2)
            .map(|w| ((w[1].x - w[0].x).powi(2) + (w[1].y - w[0].y).powi(2)).sqrt())
            .sum();
        assert!(chorded < length - 0.1);
        for (p, s) in d.points.iter().zip(&d.distances) {
            let q = d.path.point_at(*s).unwrap();
            assert!((p.x - q.x).abs() < 1e-9 && (p.y - q.y).abs() < 1e-9);
        }
    }

    #[test]
    fn failed_curve_still_advances() {
        let els = [elem(0.0, 0.0, 0.0), elem(500.0, 0.0, 300.0), elem(500.0, 90.0, 0.0)];
        let cfg = DiscretizeConfig::with_policy(SubdivisionPolicy::Interval(0.0));
        let d = discretize(&els, &cfg);
        assert_eq!(d.errors.len(), 1);
        assert!(matches!(d.errors[0], AlignmentError::InvalidSubdivisionPolicy { index: 1, .. }));
        // start, PC, final PI
        assert_eq!(d.points.len(), 3);
        assert!((d.path.length() - (400.0 + 150.0 * PI)).abs() < 1e-9);
        let end = d.points[2];
        assert!((end.x - 500.0).abs() < 1e-9);
        assert!((end.y - 500.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_gives_no_points() {
        let d = discretize(&[], &DiscretizeConfig::default());
        assert!(d.points.is_empty());
        assert!(d.errors.is_empty());
    }
}
