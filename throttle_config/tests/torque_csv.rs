use std::fs::File;
use std::io::Write;

use rstest::rstest;
use tempfile::tempdir;
use throttle_config::{TorquePoint, load_torque_csv, reference_points, validate_points};

#[rstest]
fn shipped_csv_matches_reference_points() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../etc/torque_map.csv");
    let points = load_torque_csv(&path).unwrap();
    assert_eq!(points, reference_points());
}

#[rstest]
fn loads_trimmed_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("map.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "throttle, torque_0, torque_ref").unwrap();
    writeln!(f, "0.0, 0, -20").unwrap();
    writeln!(f, "0.5, 40, 30").unwrap();
    writeln!(f, "1.0, 90, 90").unwrap();
    drop(f);

    let points = load_torque_csv(&path).unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(
        points[1],
        TorquePoint {
            throttle: 0.5,
            torque_0: 40.0,
            torque_ref: 30.0
        }
    );
}

#[rstest]
fn rejects_wrong_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("map.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "throttle,t0,t50").unwrap();
    writeln!(f, "0.0,0,0").unwrap();
    writeln!(f, "1.0,1,1").unwrap();
    drop(f);

    let err = load_torque_csv(&path).unwrap_err();
    assert!(err.to_string().contains("must have headers"));
}

#[rstest]
fn reports_bad_row_number() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("map.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "throttle,torque_0,torque_ref").unwrap();
    writeln!(f, "0.0,0,0").unwrap();
    writeln!(f, "half,1,1").unwrap();
    drop(f);

    let err = load_torque_csv(&path).unwrap_err();
    assert!(err.to_string().contains("invalid CSV row 3"), "{err}");
}

#[rstest]
fn duplicate_throttle_fractions_are_allowed() {
    let pts = [
        TorquePoint { throttle: 0.0, torque_0: 0.0, torque_ref: 0.0 },
        TorquePoint { throttle: 0.5, torque_0: 10.0, torque_ref: 10.0 },
        TorquePoint { throttle: 0.5, torque_0: 20.0, torque_ref: 20.0 },
        TorquePoint { throttle: 1.0, torque_0: 30.0, torque_ref: 30.0 },
    ];
    validate_points(&pts).unwrap();
}
