use corridor_cad::alignment::{
    resolve, Alignment, ChangeEvent, ContinuousCurve, IntersectionEquation, PiRecord, StationEquation, Stationing,
};
use corridor_cad::config::{DiscretizeConfig, SubdivisionPolicy};
use corridor_cad::geometry::{distance, Point, Point3};
use corridor_cad::AlignmentError;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn winding(name: &str) -> Alignment {
    Alignment::new(
        name,
        Point::new(1000.0, 1000.0),
        vec![
            PiRecord::bearing_distance(0.0, 0.0),
            PiRecord::bearing_distance(0.0, 600.0).with_radius(250.0),
            PiRecord::bearing_distance(70.0, 700.0).with_radius(400.0),
            PiRecord::bearing_distance(20.0, 800.0),
        ],
    )
    .with_config(DiscretizeConfig::with_policy(SubdivisionPolicy::Interval(5.0)))
}

fn straight_north(name: &str, length: f64) -> Alignment {
    Alignment::new(
        name,
        Point::default(),
        vec![
            PiRecord::bearing_distance(0.0, 0.0),
            PiRecord::bearing_distance(0.0, length),
        ],
    )
}

#[test]
fn resolution_is_monotonic() {
    init();
    let mut a = winding("main");
    let length = a.regenerate().length();
    assert!(length > 1500.0);
    let mut prev: Option<(f64, Point)> = None;
    let mut station = 0.0;
    while station <= length {
        let r = a.resolve_station(station).unwrap();
        assert!((r.distance - station).abs() < 1e-9);
        if let Some((prev_distance, prev_point)) = prev {
            assert!(r.distance > prev_distance);
            // a chord never exceeds the distance walked along the shape
            assert!(distance(prev_point, r.point.xy()) <= r.distance - prev_distance + 1e-9);
        }
        prev = Some((r.distance, r.point.xy()));
        station += 37.5;
    }
}

#[test]
fn station_equation_is_a_pure_relabeling() {
    let mut plain = straight_north("plain", 2000.0);
    let mut equated = straight_north("equated", 2000.0)
        .with_stationing(Stationing::new(0.0, vec![StationEquation::new(1000.0, 500.0)]));
    let with_eq = equated.resolve_station(600.0).unwrap();
    let without = plain.resolve_station(1100.0).unwrap();
    assert_eq!(with_eq.distance, 1100.0);
    assert!(distance(with_eq.point.xy(), without.point.xy()) < 1e-9);
    // ahead of the equation the chainage is unaffected
    let early = equated.resolve_station(400.0).unwrap();
    assert!((early.point.y - 400.0).abs() < 1e-9);
}

#[test]
fn stations_outside_the_shape_fail() {
    let shape = straight_north("short", 100.0).regenerate().plan.clone();
    assert!(resolve(100.0, &shape, &[]).is_ok());
    match resolve(150.0, &shape, &[]) {
        Err(AlignmentError::StationOutOfRange { distance, length, .. }) => {
            assert_eq!(distance, 150.0);
            assert!((length - 100.0).abs() < 1e-9);
        }
        other => panic!("unexpected {other:?}"),
    }
    let skipped = Stationing::new(0.0, vec![StationEquation::new(40.0, 60.0)]);
    match skipped.resolve(50.0, &shape) {
        Err(AlignmentError::StationOutOfRange { distance, .. }) => assert!(distance.is_nan()),
        other => panic!("unexpected {other:?}"),
    }
    let late_start = Stationing::new(1000.0, Vec::new());
    assert!(late_start.resolve(900.0, &shape).is_err());
    assert!((late_start.resolve(1060.0, &shape).unwrap().point.y - 60.0).abs() < 1e-9);
}

#[test]
fn intersection_delta_is_repeatable() {
    let mut parent = winding("parent");
    let mut child = Alignment::new(
        "ramp",
        Point::new(-50.0, 20.0),
        vec![
            PiRecord::bearing_distance(0.0, 0.0),
            PiRecord::bearing_distance(120.0, 300.0),
        ],
    )
    .with_intersection(IntersectionEquation {
        parent_station: 900.0,
        child_station: 0.0,
    });
    let first = child.intersection_delta(&mut parent).unwrap();
    let second = child.intersection_delta(&mut parent).unwrap();
    assert!(first.is_some());
    assert_eq!(first, second);

    // a regeneration from scratch yields the same bits
    parent.apply(ChangeEvent::PolicyChanged(parent.config().clone()));
    let third = child.intersection_delta(&mut parent).unwrap();
    assert_eq!(first, third);
}

#[test]
fn attaching_moves_child_onto_parent() {
    init();
    let mut parent = winding("parent");
    let mut child = Alignment::new(
        "ramp",
        Point::new(-50.0, 20.0),
        vec![
            PiRecord::bearing_distance(0.0, 0.0),
            PiRecord::bearing_distance(120.0, 300.0),
        ],
    )
    .with_intersection(IntersectionEquation {
        parent_station: 900.0,
        child_station: 100.0,
    });
    let delta = child.attach_to(&mut parent).unwrap();
    assert!(delta.is_some());

    let on_parent = parent.resolve_station(900.0).unwrap().point;
    let on_child = child.resolve_station(100.0).unwrap().point;
    assert!(distance(on_parent.xy(), on_child.xy()) < 1e-9);

    let again = child.intersection_delta(&mut parent).unwrap().unwrap();
    assert!(again.x.abs() < 1e-9 && again.y.abs() < 1e-9);
}

#[test]
fn failed_attach_leaves_child_in_place() {
    let mut parent = straight_north("parent", 100.0);
    let mut child = straight_north("child", 50.0).with_intersection(IntersectionEquation {
        parent_station: 500.0,
        child_station: 0.0,
    });
    let res = child.attach_to(&mut parent);
    assert!(matches!(res, Err(AlignmentError::StationOutOfRange { .. })));
    assert_eq!(child.placement(), Point::default());
}

#[test]
fn no_intersection_means_no_delta() {
    let mut parent = straight_north("parent", 100.0);
    let mut child = straight_north("child", 50.0);
    assert_eq!(child.intersection_delta(&mut parent).unwrap(), None::<Point3>);
}

fn quarter_turn(name: &str) -> Alignment {
    Alignment::new(
        name,
        Point::default(),
        vec![
            PiRecord::bearing_distance(0.0, 0.0),
            PiRecord::bearing_distance(90.0, 500.0).with_radius(300.0),
            PiRecord::bearing_distance(180.0, 500.0),
        ],
    )
    .with_config(DiscretizeConfig::with_policy(SubdivisionPolicy::Segment(10)))
}

#[test]
fn full_length_station_reaches_final_pi() {
    init();
    let mut a = quarter_turn("main");
    let length = 400.0 + 150.0 * std::f64::consts::PI;
    assert!((a.regenerate().length() - length).abs() < 1e-9);
    // the chorded shape is shorter than the alignment it samples
    assert!(a.regenerate().plan.length() < length - 0.4);

    let end = a.resolve_station(length).unwrap().point;
    assert!(distance(end.xy(), Point::new(500.0, -500.0)) < 1e-9);
    let pt = a.resolve_station(200.0 + 150.0 * std::f64::consts::PI).unwrap().point;
    assert!(distance(pt.xy(), Point::new(500.0, -300.0)) < 1e-9);

    // stations on the curve do not depend on the subdivision
    let coarse = a.resolve_station(400.0).unwrap().point;
    a.apply(ChangeEvent::PolicyChanged(DiscretizeConfig::with_policy(SubdivisionPolicy::Segment(3))));
    let fine = a.resolve_station(400.0).unwrap().point;
    assert!(distance(coarse.xy(), fine.xy()) < 1e-9);
    assert!((distance(fine.xy(), Point::new(200.0, -300.0)) - 300.0).abs() < 1e-9);
}

#[test]
fn attach_near_the_end_of_the_parent() {
    let mut parent = quarter_turn("parent");
    let mut child = straight_north("ramp", 50.0).with_intersection(IntersectionEquation {
        parent_station: 871.0,
        child_station: 0.0,
    });
    let delta = child.attach_to(&mut parent).unwrap().unwrap();
    assert!((delta.x - 500.0).abs() < 1e-9);
    assert!((delta.y - (-500.0 + (400.0 + 150.0 * std::f64::consts::PI - 871.0))).abs() < 1e-9);
}
