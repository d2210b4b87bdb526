//! Surveying specific utilities.

pub mod cogo;
pub use cogo::{
    bearing, deflection, forward, format_bearing, inverse, normalize_bearing, parse_bearing,
};
