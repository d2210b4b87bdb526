//! Discretization settings supplied by the caller.

use serde::{Deserialize, Serialize};

/// Arc-definition degree-of-curve constant: the radius (in feet) of a curve
/// whose 100 ft arc subtends one degree.
pub const DEGREE_CONSTANT_ARC_100: f64 = 5729.58;

/// International feet to millimetres.
pub const FEET_TO_MM: f64 = 304.8;

/// How circular arcs are broken into chords.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SubdivisionPolicy {
    /// Fixed number of chords per curve.
    Segment(u32),
    /// Fixed arc length per chord.
    Interval(f64),
    /// Maximum chord-to-arc deviation.
    Tolerance(f64),
}

impl Default for SubdivisionPolicy {
    fn default() -> Self {
        SubdivisionPolicy::Segment(10)
    }
}

impl SubdivisionPolicy {
    /// Angular step for an arc of `radius` sweeping `central_angle`.
    ///
    /// May be zero, negative or NaN for degenerate parameters; the caller
    /// validates the result.
    pub fn angle_increment(&self, radius: f64, central_angle: f64) -> f64 {
        match *self {
            SubdivisionPolicy::Segment(n) => central_angle / f64::from(n),
            SubdivisionPolicy::Interval(len) => len / radius,
            SubdivisionPolicy::Tolerance(tol) => 2.0 * (1.0 - tol / radius).acos(),
        }
    }
}

fn default_min_tangent_length() -> f64 {
    1.0
}

fn default_unit_scale() -> f64 {
    1.0
}

fn default_degree_constant() -> f64 {
    DEGREE_CONSTANT_ARC_100
}

fn default_max_curve_points() -> usize {
    10_000
}

/// Read-only configuration threaded through decoding and discretization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscretizeConfig {
    #[serde(default)]
    pub policy: SubdivisionPolicy,
    /// Straight runs shorter than this are not emitted as separate segments.
    #[serde(default = "default_min_tangent_length")]
    pub min_tangent_length: f64,
    /// Multiplier from document units to internal length units.
    #[serde(default = "default_unit_scale")]
    pub unit_scale: f64,
    /// Numerator of `radius = constant / degree`, in document units.
    #[serde(default = "default_degree_constant")]
    pub degree_constant: f64,
    /// Upper bound on points generated for a single curve.
    #[serde(default = "default_max_curve_points")]
    pub max_curve_points: usize,
}

impl Default for DiscretizeConfig {
    fn default() -> Self {
        Self {
            policy: SubdivisionPolicy::default(),
            min_tangent_length: default_min_tangent_length(),
            unit_scale: default_unit_scale(),
            degree_constant: default_degree_constant(),
            max_curve_points: default_max_curve_points(),
        }
    }
}

impl DiscretizeConfig {
    pub fn with_policy(policy: SubdivisionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Reads a configuration from a JSON file. Missing fields take defaults.
    pub fn read_json(path: &str) -> std::io::Result<Self> {
        let contents = crate::io::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
