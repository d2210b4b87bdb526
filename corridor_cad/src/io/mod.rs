//! File input and output helpers for alignment data.

use std::fs::File;
use std::io::{self, Read, Write};

use crate::geometry::Point3;

pub mod alignment_file;
pub use alignment_file::{
    read_alignment_json, write_alignment_json, AlignmentFile, ALIGNMENT_FILE_VERSION,
};

/// Reads a file to string.
pub fn read_to_string(path: &str) -> io::Result<String> {
    let mut buffer = String::new();
    File::open(path)?.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Writes a string to a file, replacing its contents.
pub fn write_string(path: &str, contents: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())
}

/// Writes points as `x,y,z` lines.
pub fn write_points_csv(path: &str, points: &[Point3]) -> io::Result<()> {
    let mut file = File::create(path)?;
    for p in points {
        writeln!(file, "{},{},{}", p.x, p.y, p.z)?;
    }
    Ok(())
}
