//! Horizontal alignment geometry: PI decoding, curve discretization and
//! station resolution.
//!
//! The pipeline is strictly sequential for one alignment:
//! [`decode`] turns raw PI records into [`GeometryElement`]s,
//! [`discretize`] turns those into an ordered point sequence, and the
//! [`station`] module maps chainage onto the resulting shape.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AlignmentError;
use crate::geometry::{Point, Point3};

pub mod decoder;
pub mod discretizer;
pub mod horizontal;
pub mod model;
pub mod spiral;
pub mod station;
pub mod vertical;

pub use decoder::decode;
pub use discretizer::{curve_tangent_length, discretize};
pub use horizontal::{HorizontalAlignment, HorizontalElement};
pub use model::{Alignment, ChangeEvent, Regenerated};
pub use spiral::discretize_spiral;
pub use station::{intersection_delta, resolve, ContinuousCurve, ResolvedStation, Stationing};
pub use vertical::{Pvi, VerticalAlignment, VerticalElement};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Text(String),
    Number(f64),
}

/// Accepts either a JSON string or a JSON number for a raw PI field.
fn lenient_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawField>::deserialize(deserializer)?.map(|f| match f {
        RawField::Text(s) => s,
        RawField::Number(n) => n.to_string(),
    }))
}

/// One point of intersection as entered by the user or an importer.
///
/// Values are kept as raw text so a malformed cell can be reported with its
/// field name instead of failing the whole table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PiRecord {
    #[serde(default, deserialize_with = "lenient_field", skip_serializing_if = "Option::is_none")]
    pub northing: Option<String>,
    #[serde(default, deserialize_with = "lenient_field", skip_serializing_if = "Option::is_none")]
    pub easting: Option<String>,
    #[serde(default, deserialize_with = "lenient_field", skip_serializing_if = "Option::is_none")]
    pub bearing: Option<String>,
    #[serde(default, deserialize_with = "lenient_field", skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(default, deserialize_with = "lenient_field", skip_serializing_if = "Option::is_none")]
    pub radius: Option<String>,
    #[serde(default, deserialize_with = "lenient_field", skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "lenient_field", skip_serializing_if = "Option::is_none")]
    pub spiral: Option<String>,
}

impl PiRecord {
    /// Builds a record from string-keyed fields (`Northing`, `Easting`,
    /// `Bearing`, `Distance`, `Radius`, `Degree`, `Spiral`).
    /// Unknown keys and blank values are ignored.
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut rec = PiRecord::default();
        for (key, value) in fields {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let slot = match key {
                "Northing" => &mut rec.northing,
                "Easting" => &mut rec.easting,
                "Bearing" => &mut rec.bearing,
                "Distance" => &mut rec.distance,
                "Radius" => &mut rec.radius,
                "Degree" => &mut rec.degree,
                "Spiral" => &mut rec.spiral,
                _ => {
                    log::debug!("ignoring unknown PI field {key}");
                    continue;
                }
            };
            *slot = Some(value.to_string());
        }
        rec
    }

    /// Record positioned relative to the previous PI. `bearing` is in
    /// decimal degrees clockwise from north.
    pub fn bearing_distance(bearing: f64, distance: f64) -> Self {
        Self {
            bearing: Some(bearing.to_string()),
            distance: Some(distance.to_string()),
            ..Self::default()
        }
    }

    /// Record at absolute grid coordinates.
    pub fn northing_easting(northing: f64, easting: f64) -> Self {
        Self {
            northing: Some(northing.to_string()),
            easting: Some(easting.to_string()),
            ..Self::default()
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius.to_string());
        self
    }

    pub fn with_degree(mut self, degree: f64) -> Self {
        self.degree = Some(degree.to_string());
        self
    }

    pub fn with_spiral(mut self, spiral_length: f64) -> Self {
        self.spiral = Some(spiral_length.to_string());
        self
    }
}

/// Decoded form of one retained PI, consumed by the discretizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryElement {
    /// Distance from the previous PI.
    pub tangent_length_from_prev: f64,
    /// Bearing of the tangent leading into this PI, radians clockwise from
    /// north.
    pub bearing_in: f64,
    /// Curve radius at this PI, 0 for an angle point.
    pub radius: f64,
    /// Length of each transition spiral, 0 for a simple curve.
    pub spiral_length: f64,
}

/// Output of [`decode`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedGeometry {
    /// Absolute position of the first retained PI.
    pub origin: Point,
    pub elements: Vec<GeometryElement>,
    pub errors: Vec<AlignmentError>,
}

/// Output of [`discretize`]; points are relative to the first PI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discretization {
    pub points: Vec<Point3>,
    /// Distance of each point along `path`.
    pub distances: Vec<f64>,
    /// Exact geometry the points were sampled from.
    pub path: HorizontalAlignment,
    pub errors: Vec<AlignmentError>,
}

/// Chainage discontinuity: `back_station` on the way in is `forward_station`
/// on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationEquation {
    pub back_station: f64,
    pub forward_station: f64,
}

impl StationEquation {
    pub fn new(back_station: f64, forward_station: f64) -> Self {
        Self {
            back_station,
            forward_station,
        }
    }
}

/// Ties a child alignment's `child_station` to `parent_station` on its
/// parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEquation {
    pub parent_station: f64,
    pub child_station: f64,
}
