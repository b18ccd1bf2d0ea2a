#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Throttle pedal to motor torque pipeline (hardware-agnostic).
//!
//! All hardware goes through `throttle_traits::Adc` and
//! `throttle_traits::FaultIndicator`.
//!
//! ## Architecture
//!
//! - **Window**: fixed-depth ring buffer per sensor (`window`)
//! - **Filter**: acquisition, scaling, validity check, moving average (`filter`)
//! - **Pedal**: per-cycle sampling of all sensors and reduction (`pedal`, `reducer`)
//! - **Torque**: throttle/speed → torque table lookup (`torque`)
//! - **Loop**: fixed-period driver wiring it all to the fault indicator (`runner`)

pub mod config;
pub mod conversions;
pub mod error;
pub mod filter;
pub mod hw_error;
pub mod mocks;
pub mod pedal;
pub mod reducer;
pub mod runner;
pub mod torque;
pub mod window;

pub use config::{FaultPolicy, PedalCfg, REFERENCE_SENSORS, SensorCalibration, SpeedLimits};
pub use error::{BuildError, ThrottleError};
pub use filter::{SampleOutcome, SensorFilter};
pub use pedal::{PedalBuilder, ThrottlePedal};
pub use reducer::{MedianOfN, Reducer, Reduction, ReductionKind, SimpleAverage, ThresholdVote};
pub use runner::{ControlLoop, CycleReport, RunParams, RunSummary};
pub use torque::{CalibrationPoint, TorqueCommand, TorqueMap};
pub use window::SampleWindow;

/// Validate `cfg`, then build the pedal and torque map it describes.
pub fn from_config<A: throttle_traits::Adc>(
    cfg: &throttle_config::Config,
    adc: A,
) -> error::Result<(ThrottlePedal<A>, TorqueMap)> {
    cfg.validate()
        .map_err(|e| eyre::Report::new(ThrottleError::Config(e.to_string())))?;
    let pedal = ThrottlePedal::builder()
        .with_adc(adc)
        .with_sensors(cfg.sensors.iter().map(SensorCalibration::from))
        .with_pedal_cfg((&cfg.pedal).into())
        .with_reduction(cfg.pedal.reduction.into())
        .build()?;
    let torque = torque_map_from_points(&cfg.torque, &cfg.torque.points)?;
    Ok((pedal, torque))
}

/// Build a torque map from config limits and an explicit point list
/// (e.g. loaded from CSV).
pub fn torque_map_from_points(
    cfg: &throttle_config::TorqueCfg,
    points: &[throttle_config::TorquePoint],
) -> error::Result<TorqueMap> {
    TorqueMap::new(
        points.iter().map(CalibrationPoint::from).collect(),
        cfg.reference_speed_kmh,
        cfg.into(),
    )
}
