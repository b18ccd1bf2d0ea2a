//! `From` implementations bridging `throttle_config` types to core types.

use crate::config::{FaultPolicy, PedalCfg, SensorCalibration, SpeedLimits};
use crate::reducer::ReductionKind;
use crate::torque::CalibrationPoint;

// ── Sensors ──────────────────────────────────────────────────────────────────

impl From<&throttle_config::SensorCfg> for SensorCalibration {
    fn from(c: &throttle_config::SensorCfg) -> Self {
        Self::new(c.channel, c.offset, c.scale)
    }
}

// ── Pedal ────────────────────────────────────────────────────────────────────

impl From<throttle_config::FaultPolicy> for FaultPolicy {
    fn from(p: throttle_config::FaultPolicy) -> Self {
        match p {
            throttle_config::FaultPolicy::Zero => Self::FailToZero,
            throttle_config::FaultPolicy::HoldLast => Self::HoldLastGood,
        }
    }
}

impl From<&throttle_config::PedalCfg> for PedalCfg {
    fn from(c: &throttle_config::PedalCfg) -> Self {
        Self {
            max_angle: c.max_angle,
            window: c.window,
            fault_policy: c.fault_policy.into(),
        }
    }
}

impl From<throttle_config::Reduction> for ReductionKind {
    fn from(r: throttle_config::Reduction) -> Self {
        match r {
            throttle_config::Reduction::Average => Self::Average,
            throttle_config::Reduction::Median => Self::Median,
            throttle_config::Reduction::Vote { threshold } => Self::Vote { threshold },
        }
    }
}

// ── Torque ───────────────────────────────────────────────────────────────────

impl From<&throttle_config::TorquePoint> for CalibrationPoint {
    fn from(p: &throttle_config::TorquePoint) -> Self {
        Self::new(p.throttle, p.torque_0, p.torque_ref)
    }
}

impl From<&throttle_config::TorqueCfg> for SpeedLimits {
    fn from(c: &throttle_config::TorqueCfg) -> Self {
        Self {
            min_reverse: c.min_speed_kmh,
            max_forward: c.max_speed_kmh,
        }
    }
}
