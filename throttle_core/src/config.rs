//! Runtime configuration types for the throttle pipeline.
//!
//! These are the structs the core consumes. They are separate from the
//! TOML-deserialized config in `throttle_config`; see `conversions`.

use throttle_traits::ChannelId;

/// Per-sensor calibration: `angle = (raw - offset) / scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorCalibration {
    pub channel: ChannelId,
    pub offset: f32,
    pub scale: f32,
}

impl SensorCalibration {
    pub const fn new(channel: ChannelId, offset: f32, scale: f32) -> Self {
        Self {
            channel,
            offset,
            scale,
        }
    }

    #[inline]
    pub fn angle(&self, raw: u32) -> f32 {
        (raw as f32 - self.offset) / self.scale
    }
}

/// The two reference pedal sensors on channels 0 and 1.
pub const REFERENCE_SENSORS: [SensorCalibration; 2] = [
    SensorCalibration::new(0, 0.5, 0.10),
    SensorCalibration::new(1, 1.0, 0.08),
];

/// What a sensor feeds into its window when a sample is bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Inject 0.0, pulling the average toward idle.
    #[default]
    FailToZero,
    /// Re-inject the last valid position (0.0 before the first valid sample).
    HoldLastGood,
}

/// Pedal-wide filter settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PedalCfg {
    /// Full pedal travel in angle units. Default: 30.0.
    pub max_angle: f32,
    /// Moving-average depth per sensor. Default: 5.
    pub window: usize,
    pub fault_policy: FaultPolicy,
}

impl Default for PedalCfg {
    fn default() -> Self {
        Self {
            max_angle: 30.0,
            window: 5,
            fault_policy: FaultPolicy::FailToZero,
        }
    }
}

/// Accepted vehicle speed range in km/h (inclusive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLimits {
    pub min_reverse: f32,
    pub max_forward: f32,
}

impl SpeedLimits {
    #[inline]
    pub fn contains(&self, speed: f32) -> bool {
        (self.min_reverse..=self.max_forward).contains(&speed)
    }
}

impl Default for SpeedLimits {
    fn default() -> Self {
        Self {
            min_reverse: -25.0,
            max_forward: 250.0,
        }
    }
}
