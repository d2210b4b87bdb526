//! Core library for corridor alignment geometry.
//!
//! Decodes PI tables into tangents, circular curves and clothoid spirals,
//! discretizes them into polylines and resolves stations (including
//! station equations) to coordinates.

pub mod alignment;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod surveying;

pub use error::{AlignmentError, Result};
