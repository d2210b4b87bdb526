//! Basic geometry primitives used by the alignment engine.
//!
//! Plan coordinates follow survey convention: `x` is easting and `y` is
//! northing. Elevations live in `z` of [`Point3`].

pub mod point;
pub mod point3;
pub mod polyline;

pub use point::{distance, Point};
pub use point3::{distance3, Point3};
pub use polyline::Polyline3;
