//! Coordinate geometry (COGO) in survey convention.
//!
//! Bearings are radians measured clockwise from grid north, so a unit
//! vector along bearing `b` is `(sin b, cos b)` in `(easting, northing)`.

use std::f64::consts::{PI, TAU};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::geometry::Point;

/// Wraps a bearing into `[0, 2π)`.
pub fn normalize_bearing(b: f64) -> f64 {
    let r = b.rem_euclid(TAU);
    // rem_euclid can return TAU itself for tiny negative inputs
    if r >= TAU {
        0.0
    } else {
        r
    }
}

/// Computes the bearing from point `a` to point `b`.
pub fn bearing(a: Point, b: Point) -> f64 {
    normalize_bearing((b.x - a.x).atan2(b.y - a.y))
}

/// Computes a new point from a starting point, a bearing and a distance.
pub fn forward(start: Point, bearing: f64, distance: f64) -> Point {
    Point::new(
        start.x + distance * bearing.sin(),
        start.y + distance * bearing.cos(),
    )
}

/// Distance and bearing from `a` to `b`.
pub fn inverse(a: Point, b: Point) -> (f64, f64) {
    (crate::geometry::distance(a, b), bearing(a, b))
}

/// Signed turn from bearing `from` to bearing `to`, in `(-π, π]`.
/// Positive values turn right (clockwise).
pub fn deflection(from: f64, to: f64) -> f64 {
    let mut d = (to - from).rem_euclid(TAU);
    if d > PI {
        d -= TAU;
    }
    d
}

static QUADRANT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?i)\s*([NS])\s*(\d+(?:\.\d*)?)(?:\s*[-°d\s]\s*(\d+(?:\.\d*)?)(?:\s*[-'m\s]\s*(\d+(?:\.\d*)?)\s*"?)?)?\s*([EW])\s*$"#,
    )
    .expect("quadrant bearing pattern is valid")
});

/// Parses a bearing given either as decimal degrees (`"45.5"`) or in
/// quadrant notation (`"N 45.5 E"`, `"S45-30-15W"`, `N45°30'15"E`).
/// Returns radians clockwise from north.
pub fn parse_bearing(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if let Ok(deg) = trimmed.parse::<f64>() {
        return deg.is_finite().then(|| normalize_bearing(deg.to_radians()));
    }
    let caps = QUADRANT.captures(trimmed)?;
    let deg: f64 = caps.get(2)?.as_str().parse().ok()?;
    let min: f64 = caps.get(3).map_or(Ok(0.0), |m| m.as_str().parse()).ok()?;
    let sec: f64 = caps.get(4).map_or(Ok(0.0), |m| m.as_str().parse()).ok()?;
    if min >= 60.0 || sec >= 60.0 {
        return None;
    }
    let angle = deg + min / 60.0 + sec / 3600.0;
    if angle > 90.0 {
        return None;
    }
    let ns = caps.get(1)?.as_str().to_ascii_uppercase();
    let ew = caps.get(5)?.as_str().to_ascii_uppercase();
    let azimuth = match (ns.as_str(), ew.as_str()) {
        ("N", "E") => angle,
        ("S", "E") => 180.0 - angle,
        ("S", "W") => 180.0 + angle,
        _ => 360.0 - angle,
    };
    Some(normalize_bearing(azimuth.to_radians()))
}

/// Formats a bearing in quadrant notation with whole seconds.
pub fn format_bearing(b: f64) -> String {
    let az = normalize_bearing(b).to_degrees();
    let (ns, angle, ew) = if az <= 90.0 {
        ('N', az, 'E')
    } else if az <= 180.0 {
        ('S', 180.0 - az, 'E')
    } else if az <= 270.0 {
        ('S', az - 180.0, 'W')
    } else {
        ('N', 360.0 - az, 'W')
    };
    let total = (angle * 3600.0).round() as i64;
    let (d, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    format!("{ns}{d}\u{00B0}{m:02}'{s:02}\"{ew}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn bearing_works() {
        let a = Point::new(0.0, 0.0);
        assert!((bearing(a, Point::new(1.0, 1.0)) - FRAC_PI_4).abs() < 1e-12);
        assert!((bearing(a, Point::new(-1.0, 0.0)) - 3.0 * FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn forward_works() {
        let p = forward(Point::new(0.0, 0.0), FRAC_PI_2, 2.0);
        assert!((p.x - 2.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
    }

    #[test]
    fn deflection_signs() {
        assert!((deflection(0.0, FRAC_PI_2) - FRAC_PI_2).abs() < 1e-12);
        assert!((deflection(FRAC_PI_2, 0.0) + FRAC_PI_2).abs() < 1e-12);
        // across north
        assert!((deflection(350f64.to_radians(), 10f64.to_radians()) - 20f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn parses_quadrant_bearings() {
        let b = parse_bearing("N 45.5 E").unwrap();
        assert!((b.to_degrees() - 45.5).abs() < 1e-9);
        let b = parse_bearing("S45-30-00W").unwrap();
        assert!((b.to_degrees() - 225.5).abs() < 1e-9);
        let b = parse_bearing("N10°15'00\"W").unwrap();
        assert!((b.to_degrees() - 349.75).abs() < 1e-9);
        let b = parse_bearing("s 30 e").unwrap();
        assert!((b.to_degrees() - 150.0).abs() < 1e-9);
        assert!((parse_bearing("90").unwrap() - FRAC_PI_2).abs() < 1e-12);
        assert!(parse_bearing("N95E").is_none());
        assert!(parse_bearing("east").is_none());
    }

    #[test]
    fn format_round_trips() {
        let b = parse_bearing("S12-34-56E").unwrap();
        assert_eq!(format_bearing(b), "S12\u{00B0}34'56\"E");
    }
}
