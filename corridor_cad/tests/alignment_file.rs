use assert_fs::prelude::*;
use corridor_cad::alignment::{Alignment, IntersectionEquation, PiRecord, Pvi, StationEquation, Stationing};
use corridor_cad::config::{DiscretizeConfig, SubdivisionPolicy};
use corridor_cad::geometry::Point;
use corridor_cad::io::{read_alignment_json, write_alignment_json, write_points_csv, AlignmentFile};
use predicates::prelude::*;

fn sample() -> Alignment {
    Alignment::new(
        "ramp A",
        Point::new(500.0, 250.0),
        vec![
            PiRecord::bearing_distance(0.0, 0.0),
            PiRecord::from_fields([("Bearing", "N45E"), ("Distance", "400"), ("Degree", "10")]),
            PiRecord::northing_easting(800.0, 900.0).with_radius(150.0).with_spiral(40.0),
            PiRecord::bearing_distance(0.0, 300.0),
        ],
    )
    .with_config(DiscretizeConfig::with_policy(SubdivisionPolicy::Tolerance(0.02)))
    .with_stationing(Stationing::new(100.0, vec![StationEquation::new(400.0, 450.0)]))
    .with_profile(vec![Pvi::new(100.0, 20.0, 0.0), Pvi::new(1200.0, 31.0, 0.0)])
    .with_intersection(IntersectionEquation {
        parent_station: 10.0,
        child_station: 100.0,
    })
}

#[test]
fn saved_alignment_regenerates_identically() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("ramp.json");
    let mut original = sample();
    write_alignment_json(file.path().to_str().unwrap(), &AlignmentFile::from(&original)).unwrap();
    file.assert(predicate::str::contains("\"version\": 1"));
    file.assert(predicate::str::contains("\"Degree\": \"10\""));

    let loaded = read_alignment_json(file.path().to_str().unwrap()).unwrap();
    assert_eq!(loaded, AlignmentFile::from(&original));
    let mut restored = loaded.into_alignment(&DiscretizeConfig::default());
    assert_eq!(restored.config().policy, SubdivisionPolicy::Tolerance(0.02));
    assert_eq!(restored.regenerate(), original.regenerate());
    temp.close().unwrap();
}

#[test]
fn document_without_config_uses_fallback() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("plain.json");
    file.write_str(
        r#"{
            "version": 1,
            "name": "plain",
            "datum": {"x": 10.0, "y": 20.0},
            "pis": [
                {"Northing": 20, "Easting": 10},
                {"Bearing": "N90E", "Distance": "200", "Radius": 50},
                {"Bearing": "S0E", "Distance": 100}
            ]
        }"#,
    )
    .unwrap();
    let loaded = read_alignment_json(file.path().to_str().unwrap()).unwrap();
    let fallback = DiscretizeConfig::with_policy(SubdivisionPolicy::Segment(4));
    let mut a = loaded.into_alignment(&fallback);
    let r = a.regenerate();
    assert!(r.errors.is_empty());
    // start, PC, four chords, end
    assert_eq!(r.plan.vertices.len(), 7);
    temp.close().unwrap();
}

#[test]
fn points_are_written_as_csv() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("points.csv");
    let mut a = sample();
    let points = a.regenerate().shape.vertices.clone();
    write_points_csv(file.path().to_str().unwrap(), &points).unwrap();
    file.assert(predicate::str::starts_with("500,250,20\n"));
    let lines = std::fs::read_to_string(file.path()).unwrap().lines().count();
    assert_eq!(lines, points.len());
    temp.close().unwrap();
}

#[test]
fn config_file_fills_defaults() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("config.json");
    file.write_str(r#"{"policy": {"Interval": 2.5}, "unit_scale": 0.3048}"#).unwrap();
    let cfg = DiscretizeConfig::read_json(file.path().to_str().unwrap()).unwrap();
    assert_eq!(cfg.policy, SubdivisionPolicy::Interval(2.5));
    assert_eq!(cfg.unit_scale, 0.3048);
    assert_eq!(cfg.min_tangent_length, 1.0);
    temp.close().unwrap();
}
