use rstest::rstest;
use throttle_core::{CalibrationPoint, SpeedLimits, ThrottleError, TorqueCommand, TorqueMap};

fn torque(throttle: f32, speed: f32) -> f32 {
    match TorqueMap::reference().torque(throttle, speed) {
        Ok(TorqueCommand::Applied(t)) => t,
        other => panic!("expected applied torque, got {other:?}"),
    }
}

/// Literal fraction `(next - prev) / (t - prev)` followed by linear speed
/// extrapolation, written out independently of the implementation.
fn oracle(prev: (f32, f32, f32), next: (f32, f32, f32), t: f32, speed: f32) -> f32 {
    let f = (next.0 - prev.0) / (t - prev.0);
    let t0 = prev.1 + f * (next.1 - prev.1);
    let t50 = prev.2 + f * (next.2 - prev.2);
    t0 + (speed / 50.0) * (t50 - t0)
}

#[rstest]
#[case(0.0, 0.0, 0.0)]
#[case(0.0, 50.0, -30.0)]
#[case(1.0, 50.0, 120.0)]
#[case(1.0, 0.0, 120.0)]
#[case(0.1, 0.0, 18.0)]
#[case(0.8, 50.0, 95.0)]
fn table_rows(#[case] throttle: f32, #[case] speed: f32, #[case] expected: f32) {
    let t = torque(throttle, speed);
    assert!((t - expected).abs() < 1e-3, "torque({throttle}, {speed}) = {t}");
}

#[rstest]
#[case(0.5, 0.0)]
#[case(0.5, 50.0)]
#[case(0.45, 30.0)]
#[case(0.55, -10.0)]
fn between_0_4_and_0_6(#[case] throttle: f32, #[case] speed: f32) {
    let expected = oracle((0.4, 62.0, 45.0), (0.6, 82.0, 72.0), throttle, speed);
    let t = torque(throttle, speed);
    assert!((t - expected).abs() < 1e-3, "{t} vs {expected}");
}

#[rstest]
fn half_throttle_differs_from_conventional_lerp() {
    let t = torque(0.5, 0.0);
    assert!((t - 102.0).abs() < 1e-3);
    // conventional interpolation would give 72.0
    assert!((t - 72.0).abs() > 1.0);
}

#[rstest]
#[case(-25.0)]
#[case(250.0)]
fn speed_limits_are_inclusive(#[case] speed: f32) {
    let cmd = TorqueMap::reference().torque(0.3, speed).unwrap();
    assert!(cmd.is_applied());
}

#[rstest]
#[case(-25.1)]
#[case(250.1)]
fn speed_outside_limits_commands_zero(#[case] speed: f32) {
    let cmd = TorqueMap::reference().torque(0.3, speed).unwrap();
    assert_eq!(cmd, TorqueCommand::SpeedOutOfRange { speed });
    assert_eq!(cmd.value(), 0.0);
}

#[rstest]
#[case(-0.01)]
#[case(1.01)]
fn throttle_outside_unit_range_is_fatal(#[case] throttle: f32) {
    let err = TorqueMap::reference().torque(throttle, 0.0).unwrap_err();
    assert_eq!(err, ThrottleError::ThrottleOutOfRange(throttle));
    assert!(err.is_fatal());
}

#[rstest]
fn throttle_is_checked_before_speed() {
    let err = TorqueMap::reference().torque(2.0, 999.0).unwrap_err();
    assert!(matches!(err, ThrottleError::ThrottleOutOfRange(_)));
}

#[rstest]
fn reference_speed_drives_the_speed_slope() {
    let points = vec![
        CalibrationPoint::new(0.0, 10.0, 20.0),
        CalibrationPoint::new(1.0, 10.0, 20.0),
    ];
    let map = TorqueMap::new(points, 100.0, SpeedLimits::default()).unwrap();
    assert_eq!(map.torque(0.0, 100.0).unwrap().value(), 20.0);
    assert_eq!(map.torque(0.0, 50.0).unwrap().value(), 15.0);
    assert_eq!(map.torque(0.0, 200.0).unwrap().value(), 30.0);
}

#[rstest]
fn shared_map_serves_concurrent_callers() {
    let map = std::sync::Arc::new(TorqueMap::reference());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let map = map.clone();
            std::thread::spawn(move || map.torque(0.25 * i as f32, 10.0).unwrap().value())
        })
        .collect();
    let results: Vec<f32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (i, r) in results.iter().enumerate() {
        assert_eq!(*r, map.torque(0.25 * i as f32, 10.0).unwrap().value());
    }
}
