//! The throttle aggregator (`ThrottlePedal`) and its builder.
//!
//! The pedal owns the acquisition backend and one `SensorFilter` per physical
//! sensor. Each control cycle samples every sensor, then the reducer combines
//! the per-sensor averages into a single normalized position.

use throttle_traits::Adc;
use tracing::{debug, error, info};

use crate::config::{PedalCfg, REFERENCE_SENSORS, SensorCalibration};
use crate::error::{BuildError, Result, ThrottleError};
use crate::filter::SensorFilter;
use crate::hw_error::map_hw_error;
use crate::reducer::{Reducer, Reduction, ReductionKind};

pub struct ThrottlePedal<A> {
    adc: A,
    sensors: Vec<SensorFilter>,
    reducer: Box<dyn Reducer>,
    // per-sensor averages, refreshed after every cycle
    averages: Vec<f32>,
}

impl<A> core::fmt::Debug for ThrottlePedal<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ThrottlePedal")
            .field("sensors", &self.sensors.len())
            .field("averages", &self.averages)
            .finish()
    }
}

impl ThrottlePedal<Missing> {
    /// Start building a pedal.
    pub fn builder() -> PedalBuilder<Missing> {
        PedalBuilder::default()
    }
}

impl<A: Adc> ThrottlePedal<A> {
    /// Sample every sensor once.
    ///
    /// Returns true only if every sensor produced a valid sample. All sensors
    /// are sampled even after a failure so their windows stay in step.
    pub fn update_cycle(&mut self) -> bool {
        let mut ok = true;
        for (sensor, avg) in self.sensors.iter_mut().zip(self.averages.iter_mut()) {
            ok &= sensor.acquire(&mut self.adc);
            *avg = sensor.average();
        }
        ok
    }

    /// Access the acquisition backend (e.g. to inject readings in tests).
    pub fn adc_mut(&mut self) -> &mut A {
        &mut self.adc
    }
}

impl<A> ThrottlePedal<A> {
    /// Current normalized throttle position in [0.0, 1.0].
    pub fn position(&self) -> f32 {
        self.reduce().position
    }

    /// False when the reducer detected sensor disagreement.
    ///
    /// Always true for the default `SimpleAverage` reducer.
    pub fn sensors_consistent(&self) -> bool {
        self.reduce().consistent
    }

    /// Position and consistency computed together.
    pub fn reduce(&self) -> Reduction {
        self.reducer.reduce(&self.averages)
    }

    pub fn sensor_averages(&self) -> &[f32] {
        &self.averages
    }

    pub fn sensor(&self, index: usize) -> Option<&SensorFilter> {
        self.sensors.get(index)
    }

    pub fn sensors(&self) -> &[SensorFilter] {
        &self.sensors
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

/// Placeholder for a builder slot that has not been filled yet.
pub struct Missing;

/// Builder for `ThrottlePedal`. `build()` is only available once an ADC has
/// been supplied.
pub struct PedalBuilder<A> {
    adc: A,
    sensors: Option<Vec<SensorCalibration>>,
    pedal: PedalCfg,
    reducer: Option<Box<dyn Reducer>>,
}

impl Default for PedalBuilder<Missing> {
    fn default() -> Self {
        Self {
            adc: Missing,
            sensors: None,
            pedal: PedalCfg::default(),
            reducer: None,
        }
    }
}

impl<A> PedalBuilder<A> {
    pub fn with_adc<B: Adc>(self, adc: B) -> PedalBuilder<B> {
        PedalBuilder {
            adc,
            sensors: self.sensors,
            pedal: self.pedal,
            reducer: self.reducer,
        }
    }

    /// Replace the sensor list. Defaults to the two reference sensors.
    pub fn with_sensors(mut self, sensors: impl IntoIterator<Item = SensorCalibration>) -> Self {
        self.sensors = Some(sensors.into_iter().collect());
        self
    }

    pub fn with_pedal_cfg(mut self, pedal: PedalCfg) -> Self {
        self.pedal = pedal;
        self
    }

    pub fn with_reducer(mut self, reducer: Box<dyn Reducer>) -> Self {
        self.reducer = Some(reducer);
        self
    }

    pub fn with_reduction(self, kind: ReductionKind) -> Self {
        self.with_reducer(kind.build())
    }
}

impl<A: Adc> PedalBuilder<A> {
    /// Validate the configuration and initialize every acquisition channel.
    ///
    /// A channel that fails to initialize is a fatal configuration error:
    /// the pedal is not constructed.
    pub fn build(self) -> Result<ThrottlePedal<A>> {
        let Self {
            mut adc,
            sensors,
            pedal,
            reducer,
        } = self;

        let sensors = sensors.unwrap_or_else(|| REFERENCE_SENSORS.to_vec());
        if sensors.is_empty() {
            return Err(eyre::Report::new(BuildError::NoSensors));
        }
        if !(pedal.max_angle.is_finite() && pedal.max_angle > 0.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "max_angle must be > 0",
            )));
        }
        if pedal.window == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "window must be >= 1",
            )));
        }
        if sensors
            .iter()
            .any(|s| !s.scale.is_finite() || s.scale == 0.0 || !s.offset.is_finite())
        {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "sensor scale must be finite and non-zero",
            )));
        }

        for s in &sensors {
            if let Err(e) = adc.init(s.channel) {
                let reason = map_hw_error(&*e).to_string();
                error!(channel = s.channel, %reason, "failed to initialize adc channel");
                return Err(eyre::Report::new(ThrottleError::ChannelInit {
                    channel: s.channel,
                    reason,
                }));
            }
            info!(channel = s.channel, "adc channel initialized ok");
        }

        let filters: Vec<SensorFilter> = sensors
            .iter()
            .map(|c| SensorFilter::new(*c, &pedal))
            .collect();
        debug!(
            sensors = filters.len(),
            window = pedal.window,
            policy = ?pedal.fault_policy,
            "throttle pedal ready"
        );

        Ok(ThrottlePedal {
            adc,
            averages: vec![0.0; filters.len()],
            sensors: filters,
            reducer: reducer.unwrap_or_else(|| ReductionKind::default().build()),
        })
    }
}
