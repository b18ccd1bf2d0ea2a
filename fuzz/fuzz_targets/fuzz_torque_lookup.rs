#![no_main]
use libfuzzer_sys::fuzz_target;
use throttle_core::{ThrottleError, TorqueCommand, TorqueMap};

fuzz_target!(|input: (f32, f32)| {
    let (throttle, speed) = input;
    let map = TorqueMap::reference();
    match map.torque(throttle, speed) {
        Ok(TorqueCommand::Applied(_)) => {
            assert!((0.0..=1.0).contains(&throttle));
            assert!(map.limits().contains(speed));
        }
        Ok(TorqueCommand::SpeedOutOfRange { .. }) => assert!(!map.limits().contains(speed)),
        Err(ThrottleError::ThrottleOutOfRange(_)) => assert!(!(0.0..=1.0).contains(&throttle)),
        Err(other) => panic!("unexpected error {other}"),
    }
});
