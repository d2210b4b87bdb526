//! Turns raw PI records into canonical geometry elements.

use log::{debug, warn};

use super::{DecodedGeometry, GeometryElement, PiRecord};
use crate::config::DiscretizeConfig;
use crate::error::{AlignmentError, Result};
use crate::geometry::Point;
use crate::surveying::{forward, inverse, parse_bearing};

/// PIs closer than this to the previous one are treated as coincident.
const COINCIDENT_DISTANCE: f64 = 1e-9;

/// Position and curve data of one record before it is related to its
/// neighbours.
struct DecodedRecord {
    position: Point,
    /// Bearing and distance exactly as given, when the record was relative.
    relative: Option<(f64, f64)>,
    radius: f64,
    spiral_length: f64,
}

fn number(index: usize, field: &str, raw: &Option<String>) -> Result<Option<f64>> {
    let Some(text) = raw.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(AlignmentError::DataConversion {
            index,
            field: field.to_string(),
            value: text.to_string(),
        }),
    }
}

fn bearing_field(index: usize, raw: &Option<String>) -> Result<Option<f64>> {
    let Some(text) = raw.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    parse_bearing(text)
        .map(Some)
        .ok_or_else(|| AlignmentError::DataConversion {
            index,
            field: "Bearing".to_string(),
            value: text.to_string(),
        })
}

fn decode_curve(index: usize, rec: &PiRecord, config: &DiscretizeConfig) -> Result<(f64, f64)> {
    let radius = number(index, "Radius", &rec.radius)?;
    let degree = number(index, "Degree", &rec.degree)?;
    let spiral = number(index, "Spiral", &rec.spiral)?.unwrap_or(0.0);

    let radius = match (radius, degree) {
        (Some(_), Some(_)) => {
            return Err(AlignmentError::InvalidCurveDefinition {
                index,
                reason: "both Radius and Degree given".to_string(),
            })
        }
        (Some(r), None) if r < 0.0 => {
            return Err(AlignmentError::InvalidCurveDefinition {
                index,
                reason: format!("negative radius {r}"),
            })
        }
        (Some(r), None) => r,
        (None, Some(d)) if d <= 0.0 => {
            return Err(AlignmentError::InvalidCurveDefinition {
                index,
                reason: format!("degree of curvature must be positive, got {d}"),
            })
        }
        (None, Some(d)) => config.degree_constant / d,
        (None, None) => 0.0,
    };

    if spiral < 0.0 {
        return Err(AlignmentError::InvalidCurveDefinition {
            index,
            reason: format!("negative spiral length {spiral}"),
        });
    }
    if spiral > 0.0 && radius == 0.0 {
        return Err(AlignmentError::IncompleteCurveDefinition {
            index,
            reason: "Spiral given without Radius or Degree".to_string(),
        });
    }
    Ok((radius * config.unit_scale, spiral * config.unit_scale))
}

fn decode_record(
    index: usize,
    rec: &PiRecord,
    current: Point,
    first: bool,
    config: &DiscretizeConfig,
) -> Result<DecodedRecord> {
    let northing = number(index, "Northing", &rec.northing)?;
    let easting = number(index, "Easting", &rec.easting)?;
    let bearing = bearing_field(index, &rec.bearing)?;
    let distance = number(index, "Distance", &rec.distance)?;
    let scale = config.unit_scale;

    let (position, relative) = match (northing, easting, bearing, distance) {
        (Some(n), Some(e), ..) => {
            if bearing.is_some() || distance.is_some() {
                debug!("record {index}: coordinates given, ignoring bearing/distance");
            }
            (Point::new(e * scale, n * scale), None)
        }
        (None, None, Some(b), Some(d)) => {
            if d < 0.0 {
                return Err(AlignmentError::IncompletePosition {
                    index,
                    reason: format!("negative distance {d}"),
                });
            }
            let d = d * scale;
            (forward(current, b, d), Some((b, d)))
        }
        (None, None, None, None) if first => (current, None),
        (None, None, None, None) => {
            return Err(AlignmentError::IncompletePosition {
                index,
                reason: "neither Northing/Easting nor Bearing/Distance given".to_string(),
            })
        }
        _ => {
            return Err(AlignmentError::IncompletePosition {
                index,
                reason: "partial Northing/Easting or Bearing/Distance pair".to_string(),
            })
        }
    };

    let (radius, spiral_length) = decode_curve(index, rec, config)?;
    Ok(DecodedRecord {
        position,
        relative,
        radius,
        spiral_length,
    })
}

/// Decodes `records` starting from `datum`.
///
/// Bad records are reported in [`DecodedGeometry::errors`] and skipped;
/// the running position is left where the last good record put it.
/// The first retained record becomes the alignment origin.
pub fn decode(records: &[PiRecord], datum: Point, config: &DiscretizeConfig) -> DecodedGeometry {
    let mut out = DecodedGeometry {
        origin: datum,
        ..DecodedGeometry::default()
    };
    let mut current = datum;

    for (index, rec) in records.iter().enumerate() {
        let first = out.elements.is_empty();
        let decoded = match decode_record(index, rec, current, first, config) {
            Ok(d) => d,
            Err(e) => {
                warn!("skipping PI record: {e}");
                out.errors.push(e);
                continue;
            }
        };

        if first {
            out.origin = decoded.position;
            out.elements.push(GeometryElement {
                tangent_length_from_prev: 0.0,
                bearing_in: decoded.relative.map_or(0.0, |(b, _)| b),
                radius: decoded.radius,
                spiral_length: decoded.spiral_length,
            });
            current = decoded.position;
            continue;
        }

        let (distance, bearing) = match decoded.relative {
            Some((b, d)) => (d, b),
            None => inverse(current, decoded.position),
        };
        if distance <= COINCIDENT_DISTANCE {
            debug!("record {index}: coincident with previous PI, dropped");
            continue;
        }
        out.elements.push(GeometryElement {
            tangent_length_from_prev: distance,
            bearing_in: bearing,
            radius: decoded.radius,
            spiral_length: decoded.spiral_length,
        });
        current = decoded.position;
    }

    // The start PI has no incoming tangent; giving it the first leg's
    // bearing keeps a curve from ever being placed there.
    if out.elements.len() > 1 {
        out.elements[0].bearing_in = out.elements[1].bearing_in;
    }
    if let Some(first) = out.elements.first() {
        if first.radius > 0.0 {
            warn!("curve on the first PI is ignored");
        }
    }
    if out.elements.len() > 1 {
        if let Some(last) = out.elements.last() {
            if last.radius > 0.0 {
                warn!("curve on the last PI is ignored");
            }
        }
    }
    debug!(
        "decoded {} of {} PI records ({} errors)",
        out.elements.len(),
        records.len(),
        out.errors.len()
    );
    out
}
