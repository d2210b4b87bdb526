//! Station to distance and coordinate resolution.
//!
//! Station equations split the chainage into segments
//! `[start, back₀]`, `[fwd₀, back₁]`, …, `[fwdₙ, ∞)` that are each
//! continuous with physical distance.

use log::warn;
use serde::{Deserialize, Serialize};

use super::{IntersectionEquation, StationEquation};
use crate::error::{AlignmentError, Result};
use crate::geometry::{Point3, Polyline3};

/// Slack when testing whether a station lies in a segment.
const STATION_EPSILON: f64 = 1e-9;

/// A shape that can be walked by arc length.
pub trait ContinuousCurve {
    fn length(&self) -> f64;

    /// Point `distance` from the start, `None` outside `0..=length`.
    fn point_at_distance(&self, distance: f64) -> Option<Point3>;
}

impl ContinuousCurve for Polyline3 {
    fn length(&self) -> f64 {
        Polyline3::length(self)
    }

    fn point_at_distance(&self, distance: f64) -> Option<Point3> {
        Polyline3::point_at_distance(self, distance)
    }
}

/// A station located on a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStation {
    pub station: f64,
    /// Distance from the start of the shape.
    pub distance: f64,
    pub point: Point3,
}

/// Chainage definition of one alignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stationing {
    #[serde(default)]
    pub start_station: f64,
    #[serde(default)]
    pub equations: Vec<StationEquation>,
}

/// One distance-continuous run of stations.
struct Segment {
    reference: f64,
    end: f64,
    /// Distance travelled before `reference`.
    offset: f64,
}

impl Stationing {
    pub fn new(start_station: f64, equations: Vec<StationEquation>) -> Self {
        Self {
            start_station,
            equations,
        }
    }

    fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::with_capacity(self.equations.len() + 1);
        let mut reference = self.start_station;
        let mut travelled = 0.0;
        for eq in &self.equations {
            let len = eq.back_station - reference;
            if len < 0.0 {
                warn!(
                    "station equation {} = {} lies behind its segment start {reference}",
                    eq.back_station, eq.forward_station
                );
            }
            segments.push(Segment {
                reference,
                end: eq.back_station,
                offset: travelled,
            });
            travelled += len.max(0.0);
            reference = eq.forward_station;
        }
        segments.push(Segment {
            reference,
            end: f64::INFINITY,
            offset: travelled,
        });
        segments
    }

    /// Distance along the alignment of `station`.
    ///
    /// When a backward equation makes a station occur twice, the later
    /// occurrence wins. Returns `None` for a station that no segment
    /// covers (before the start, or skipped by a forward equation).
    pub fn global_distance(&self, station: f64) -> Option<f64> {
        self.segments()
            .iter()
            .rev()
            .find(|s| {
                station >= s.reference - STATION_EPSILON && station <= s.end + STATION_EPSILON
            })
            .map(|s| s.offset + (station - s.reference))
    }

    /// Station at `distance` along the alignment; inverse of
    /// [`Stationing::global_distance`] on each segment.
    pub fn station_at(&self, distance: f64) -> f64 {
        let segments = self.segments();
        for seg in &segments {
            let len = (seg.end - seg.reference).max(0.0);
            if distance <= seg.offset + len {
                return seg.reference + (distance - seg.offset);
            }
        }
        // the last segment is unbounded, so this is only reached for NaN
        let last = &segments[segments.len() - 1];
        last.reference + (distance - last.offset)
    }

    /// Locates `station` on `curve`.
    ///
    /// Fails with [`AlignmentError::StationOutOfRange`] if the station maps
    /// outside the curve; nothing is clamped.
    pub fn resolve<C: ContinuousCurve + ?Sized>(&self, station: f64, curve: &C) -> Result<ResolvedStation> {
        let length = curve.length();
        let out_of_range = |distance: f64| AlignmentError::StationOutOfRange {
            station,
            distance,
            length,
        };
        let distance = self
            .global_distance(station)
            .ok_or_else(|| out_of_range(f64::NAN))?;
        if !(0.0..=length).contains(&distance) {
            return Err(out_of_range(distance));
        }
        let point = curve
            .point_at_distance(distance)
            .ok_or_else(|| out_of_range(distance))?;
        Ok(ResolvedStation {
            station,
            distance,
            point,
        })
    }
}

/// Locates `local_station` on `curve` for an alignment starting at
/// station 0 with the given equations.
pub fn resolve<C: ContinuousCurve + ?Sized>(
    local_station: f64,
    curve: &C,
    equations: &[StationEquation],
) -> Result<ResolvedStation> {
    Stationing::new(0.0, equations.to_vec()).resolve(local_station, curve)
}

/// Offset to add to a child alignment's placement so that
/// `eq.child_station` on the child lands on `eq.parent_station` on the
/// parent.
pub fn intersection_delta<P, C>(
    parent: &P,
    parent_stationing: &Stationing,
    child: &C,
    child_stationing: &Stationing,
    eq: IntersectionEquation,
) -> Result<Point3>
where
    P: ContinuousCurve + ?Sized,
    C: ContinuousCurve + ?Sized,
{
    let on_parent = parent_stationing.resolve(eq.parent_station, parent)?;
    let on_child = child_stationing.resolve(eq.child_station, child)?;
    Ok(on_parent.point - on_child.point)
}
