#![no_main]
use libfuzzer_sys::fuzz_target;

// Parsing and validation may reject input but must never panic; a config that
// validates must also build a torque map.
fuzz_target!(|data: &str| {
    if let Ok(cfg) = toml::from_str::<throttle_config::Config>(data)
        && cfg.validate().is_ok()
    {
        let map = throttle_core::torque_map_from_points(&cfg.torque, &cfg.torque.points);
        assert!(map.is_ok(), "validated config rejected by TorqueMap: {map:?}");
    }
});
