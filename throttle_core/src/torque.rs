//! Two-dimensional torque map: (throttle, vehicle speed) -> motor torque.
//!
//! The map is immutable after construction and can be shared freely
//! (`Arc<TorqueMap>`) across any number of concurrent callers.

use tracing::{error, warn};

use crate::config::SpeedLimits;
use crate::error::{BuildError, Result, ThrottleError};

/// One row of the torque table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPoint {
    /// Pedal position, 0.0 ..= 1.0.
    pub throttle: f32,
    /// Torque at standstill (Nm).
    pub torque_0: f32,
    /// Torque at the map's reference speed (Nm).
    pub torque_ref: f32,
}

impl CalibrationPoint {
    pub const fn new(throttle: f32, torque_0: f32, torque_ref: f32) -> Self {
        Self {
            throttle,
            torque_0,
            torque_ref,
        }
    }
}

/// Reference calibration; the second torque column is at 50 km/h.
pub const REFERENCE_POINTS: [CalibrationPoint; 8] = [
    CalibrationPoint::new(0.00, 0.0, -30.0),
    CalibrationPoint::new(0.10, 18.0, -10.0),
    CalibrationPoint::new(0.20, 35.0, 10.0),
    CalibrationPoint::new(0.30, 50.0, 30.0),
    CalibrationPoint::new(0.40, 62.0, 45.0),
    CalibrationPoint::new(0.60, 82.0, 72.0),
    CalibrationPoint::new(0.80, 103.0, 95.0),
    CalibrationPoint::new(1.00, 120.0, 120.0),
];

pub const REFERENCE_SPEED_KMH: f32 = 50.0;

/// Outcome of a torque request with a valid throttle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TorqueCommand {
    Applied(f32),
    /// Speed outside the configured limits; the motor gets 0 Nm this cycle.
    SpeedOutOfRange { speed: f32 },
}

impl TorqueCommand {
    /// Torque to command (0.0 for a rejected speed).
    pub fn value(&self) -> f32 {
        match *self {
            Self::Applied(t) => t,
            Self::SpeedOutOfRange { .. } => 0.0,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TorqueMap {
    points: Vec<CalibrationPoint>,
    reference_speed: f32,
    limits: SpeedLimits,
}

impl TorqueMap {
    /// Validate and build a map.
    ///
    /// The table needs at least two points, non-decreasing throttle, and must
    /// start at 0.0 and end at 1.0. `reference_speed` is the speed of the
    /// `torque_ref` column.
    pub fn new(
        points: Vec<CalibrationPoint>,
        reference_speed: f32,
        limits: SpeedLimits,
    ) -> Result<Self> {
        if points.len() < 2 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "torque table needs at least two points",
            )));
        }
        if points
            .iter()
            .any(|p| !(p.throttle.is_finite() && p.torque_0.is_finite() && p.torque_ref.is_finite()))
        {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "torque table values must be finite",
            )));
        }
        if points.windows(2).any(|w| w[1].throttle < w[0].throttle) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "torque table throttle must be non-decreasing",
            )));
        }
        if points[0].throttle != 0.0 || points[points.len() - 1].throttle != 1.0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "torque table must span throttle 0.0 ..= 1.0",
            )));
        }
        if !(reference_speed.is_finite() && reference_speed > 0.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "reference speed must be > 0",
            )));
        }
        if !(limits.min_reverse.is_finite()
            && limits.max_forward.is_finite()
            && limits.min_reverse < limits.max_forward)
        {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "speed limits must satisfy min < max",
            )));
        }
        Ok(Self {
            points,
            reference_speed,
            limits,
        })
    }

    /// The reference calibration with speed limits [-25, 250] km/h.
    pub fn reference() -> Self {
        Self {
            points: REFERENCE_POINTS.to_vec(),
            reference_speed: REFERENCE_SPEED_KMH,
            limits: SpeedLimits::default(),
        }
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    pub fn reference_speed(&self) -> f32 {
        self.reference_speed
    }

    pub fn limits(&self) -> SpeedLimits {
        self.limits
    }

    /// Desired motor torque for `throttle` (0.0 ..= 1.0) at `speed` km/h.
    ///
    /// A throttle outside [0, 1] is a caller contract violation and returns
    /// `ThrottleError::ThrottleOutOfRange`; the control loop must stop on it.
    /// A speed outside the limits is recoverable: it yields
    /// `TorqueCommand::SpeedOutOfRange`, which commands 0 Nm.
    ///
    /// Between two table rows the throttle fraction is
    /// `(next - prev) / (throttle - prev)`; torque is then extrapolated
    /// linearly in speed along the 0 → reference-speed slope.
    pub fn torque(&self, throttle: f32, speed: f32) -> std::result::Result<TorqueCommand, ThrottleError> {
        if !(0.0..=1.0).contains(&throttle) {
            error!(throttle, "invalid throttle");
            return Err(ThrottleError::ThrottleOutOfRange(throttle));
        }
        if !self.limits.contains(speed) {
            warn!(speed, "invalid speed");
            return Ok(TorqueCommand::SpeedOutOfRange { speed });
        }

        // first row at or above the throttle; row 0 is 0.0 so this always hits
        let next = self
            .points
            .iter()
            .position(|p| throttle <= p.throttle)
            .unwrap_or(self.points.len() - 1);

        let (t0, tref) = if next == 0 {
            (self.points[0].torque_0, self.points[0].torque_ref)
        } else {
            let prev = &self.points[next - 1];
            let next = &self.points[next];
            let fraction = (next.throttle - prev.throttle) / (throttle - prev.throttle);
            (
                prev.torque_0 + fraction * (next.torque_0 - prev.torque_0),
                prev.torque_ref + fraction * (next.torque_ref - prev.torque_ref),
            )
        };

        let speed_fraction = speed / self.reference_speed;
        Ok(TorqueCommand::Applied(t0 + speed_fraction * (tref - t0)))
    }
}

impl Default for TorqueMap {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(map: &TorqueMap, throttle: f32, speed: f32) -> f32 {
        match map.torque(throttle, speed).unwrap() {
            TorqueCommand::Applied(t) => t,
            other => panic!("expected applied torque, got {other:?}"),
        }
    }

    #[test]
    fn idle_at_standstill_is_zero() {
        assert_eq!(applied(&TorqueMap::reference(), 0.0, 0.0), 0.0);
    }

    #[test]
    fn idle_follows_speed_slope() {
        let map = TorqueMap::reference();
        assert_eq!(applied(&map, 0.0, 50.0), -30.0);
        assert_eq!(applied(&map, 0.0, 250.0), -150.0);
        assert_eq!(applied(&map, 0.0, -25.0), 15.0);
    }

    #[test]
    fn full_throttle_at_reference_speed() {
        assert_eq!(applied(&TorqueMap::reference(), 1.0, 50.0), 120.0);
    }

    #[test]
    fn exact_row_uses_unit_fraction() {
        // throttle on a row: fraction (next-prev)/(t-prev) == 1
        let t = applied(&TorqueMap::reference(), 0.4, 0.0);
        assert!((t - 62.0).abs() < 1e-3, "{t}");
    }

    #[test]
    fn between_rows_uses_literal_fraction() {
        // rows 0.4 (62, 45) and 0.6 (82, 72); fraction = 0.2 / 0.1 = 2
        let map = TorqueMap::reference();
        let t0 = applied(&map, 0.5, 0.0);
        let t50 = applied(&map, 0.5, 50.0);
        assert!((t0 - 102.0).abs() < 1e-3, "{t0}");
        assert!((t50 - 99.0).abs() < 1e-3, "{t50}");
        assert!((applied(&map, 0.5, 25.0) - 100.5).abs() < 1e-3);
    }

    #[test]
    fn throttle_contract_violation_is_an_error() {
        let map = TorqueMap::reference();
        assert_eq!(
            map.torque(-0.01, 0.0),
            Err(ThrottleError::ThrottleOutOfRange(-0.01))
        );
        assert!(map.torque(1.01, 0.0).unwrap_err().is_fatal());
        assert!(map.torque(f32::NAN, 0.0).is_err());
    }

    #[test]
    fn speed_violation_is_recoverable() {
        let map = TorqueMap::reference();
        for speed in [-25.1, 250.1, f32::NAN] {
            let cmd = map.torque(0.5, speed).unwrap();
            assert!(!cmd.is_applied());
            assert_eq!(cmd.value(), 0.0);
        }
    }

    #[test]
    fn rejects_malformed_tables() {
        let limits = SpeedLimits::default();
        let short = vec![CalibrationPoint::new(0.0, 0.0, 0.0)];
        assert!(TorqueMap::new(short, 50.0, limits).is_err());

        let unsorted = vec![
            CalibrationPoint::new(0.0, 0.0, 0.0),
            CalibrationPoint::new(0.7, 1.0, 1.0),
            CalibrationPoint::new(0.3, 1.0, 1.0),
            CalibrationPoint::new(1.0, 1.0, 1.0),
        ];
        assert!(TorqueMap::new(unsorted, 50.0, limits).is_err());

        let short_span = vec![
            CalibrationPoint::new(0.0, 0.0, 0.0),
            CalibrationPoint::new(0.9, 1.0, 1.0),
        ];
        assert!(TorqueMap::new(short_span, 50.0, limits).is_err());

        assert!(TorqueMap::new(REFERENCE_POINTS.to_vec(), 0.0, limits).is_err());
    }
}
