//! Per-sensor acquisition, scaling, validity check and moving average.

use throttle_traits::{Adc, ChannelId};
use tracing::{trace, warn};

use crate::config::{FaultPolicy, PedalCfg, SensorCalibration};
use crate::window::SampleWindow;

/// What happened to the most recent sample of a sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// No `acquire` yet.
    Pending,
    Valid { raw: u32, angle: f32 },
    ReadFailed,
    OutOfRange { raw: u32, angle: f32 },
}

impl SampleOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// One pedal sensor: calibration, validity limits and its sample window.
#[derive(Debug, Clone)]
pub struct SensorFilter {
    calibration: SensorCalibration,
    max_angle: f32,
    policy: FaultPolicy,
    window: SampleWindow,
    last_good: f32,
    outcome: SampleOutcome,
}

impl SensorFilter {
    pub fn new(calibration: SensorCalibration, cfg: &PedalCfg) -> Self {
        Self {
            calibration,
            max_angle: cfg.max_angle,
            policy: cfg.fault_policy,
            window: SampleWindow::new(cfg.window),
            last_good: 0.0,
            outcome: SampleOutcome::Pending,
        }
    }

    pub fn channel(&self) -> ChannelId {
        self.calibration.channel
    }

    pub fn calibration(&self) -> &SensorCalibration {
        &self.calibration
    }

    /// Read one raw sample and push the derived position into the window.
    ///
    /// Returns false when the read failed or the angle fell outside
    /// `[0, max_angle]`; the window still advances by exactly one entry.
    pub fn acquire<A: Adc + ?Sized>(&mut self, adc: &mut A) -> bool {
        let channel = self.calibration.channel;
        self.outcome = match adc.read(channel) {
            Ok(raw) => {
                let angle = self.calibration.angle(raw);
                if (0.0..=self.max_angle).contains(&angle) {
                    SampleOutcome::Valid { raw, angle }
                } else {
                    warn!(channel, raw, angle, "pedal angle out of range");
                    SampleOutcome::OutOfRange { raw, angle }
                }
            }
            Err(e) => {
                warn!(channel, error = %e, "failed to read pedal sensor");
                SampleOutcome::ReadFailed
            }
        };

        let position = match self.outcome {
            SampleOutcome::Valid { angle, .. } => {
                let p = angle / self.max_angle;
                self.last_good = p;
                p
            }
            _ => match self.policy {
                FaultPolicy::FailToZero => 0.0,
                FaultPolicy::HoldLastGood => self.last_good,
            },
        };
        self.window.push(position);
        trace!(channel, position, "pedal sample stored");

        self.outcome.is_valid()
    }

    /// Moving average over the window.
    pub fn average(&self) -> f32 {
        self.window.mean()
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn last_outcome(&self) -> SampleOutcome {
        self.outcome
    }
}
