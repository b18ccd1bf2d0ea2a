//! Fixed-period control loop: pedal → fault indicator → torque.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use throttle_traits::{Adc, Clock, FaultIndicator};
use tracing::{debug, error, info, warn};

use crate::error::{Result, ThrottleError};
use crate::pedal::ThrottlePedal;
use crate::torque::{TorqueCommand, TorqueMap};

/// Outcome of one control cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// 1-based cycle counter.
    pub cycle: u64,
    /// All sensors produced valid samples this cycle.
    pub ok: bool,
    pub throttle: f32,
    /// Reducer consistency flag (always true for the simple average).
    pub consistent: bool,
    pub speed: f32,
    pub torque: TorqueCommand,
}

/// Loop parameters for `ControlLoop::run`.
#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    pub period: Duration,
    /// Stop after this many cycles; `None` runs until shutdown.
    pub max_cycles: Option<u64>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(10),
            max_cycles: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub cycles: u64,
    /// Cycles in which at least one sensor failed.
    pub faulty_cycles: u64,
    /// Cycles that finished after their deadline.
    pub overruns: u64,
    pub last: Option<CycleReport>,
}

pub struct ControlLoop<A, F, C> {
    pedal: ThrottlePedal<A>,
    torque: Arc<TorqueMap>,
    indicator: F,
    clock: C,
    cycle: u64,
}

impl<A: Adc, F: FaultIndicator, C: Clock> ControlLoop<A, F, C> {
    /// Wire the loop together and initialize the fault indicator.
    pub fn new(
        pedal: ThrottlePedal<A>,
        torque: Arc<TorqueMap>,
        mut indicator: F,
        clock: C,
    ) -> Result<Self> {
        indicator
            .init()
            .map_err(|e| eyre::Report::new(ThrottleError::Indicator(e.to_string())))
            .wrap_err("initializing fault indicator")?;
        Ok(Self {
            pedal,
            torque,
            indicator,
            clock,
            cycle: 0,
        })
    }

    pub fn pedal(&self) -> &ThrottlePedal<A> {
        &self.pedal
    }

    pub fn pedal_mut(&mut self) -> &mut ThrottlePedal<A> {
        &mut self.pedal
    }

    pub fn torque_map(&self) -> &Arc<TorqueMap> {
        &self.torque
    }

    /// Run one control cycle at the given vehicle speed.
    ///
    /// A throttle contract violation from the torque map is returned as an
    /// error; the caller must not keep cycling after it.
    pub fn step(&mut self, speed: f32) -> Result<CycleReport> {
        self.cycle += 1;
        let ok = self.pedal.update_cycle();
        if let Err(e) = self.indicator.set(!ok) {
            // the indicator is best-effort; the torque path keeps running
            warn!(error = %e, "failed to drive fault indicator");
        }

        let reduction = self.pedal.reduce();
        let torque = self
            .torque
            .torque(reduction.position, speed)
            .map_err(eyre::Report::new)
            .wrap_err_with(|| format!("torque request in cycle {}", self.cycle))?;

        if !reduction.consistent {
            warn!(cycle = self.cycle, throttle = reduction.position, "pedal sensors disagree");
        }
        debug!(
            cycle = self.cycle,
            ok,
            throttle = reduction.position,
            speed,
            torque = torque.value(),
            "control cycle"
        );

        Ok(CycleReport {
            cycle: self.cycle,
            ok,
            throttle: reduction.position,
            consistent: reduction.consistent,
            speed,
            torque,
        })
    }

    /// Run cycles on absolute deadlines until `max_cycles` or `shutdown`.
    ///
    /// `speed` is polled once per cycle; `on_cycle` sees every report.
    pub fn run(
        &mut self,
        params: RunParams,
        shutdown: &AtomicBool,
        mut speed: impl FnMut() -> f32,
        mut on_cycle: impl FnMut(&CycleReport),
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let period = params.period.max(Duration::from_millis(1));
        let mut deadline = self.clock.now() + period;
        info!(period_ms = period.as_millis() as u64, max_cycles = ?params.max_cycles, "control loop start");

        loop {
            if shutdown.load(Ordering::Relaxed) {
                info!(cycles = summary.cycles, "control loop stopped on shutdown");
                break;
            }
            if params.max_cycles.is_some_and(|n| summary.cycles >= n) {
                break;
            }

            let report = match self.step(speed()) {
                Ok(r) => r,
                Err(e) => {
                    error!(error = %e, cycle = self.cycle, "control loop aborted");
                    return Err(e);
                }
            };
            summary.cycles += 1;
            if !report.ok {
                summary.faulty_cycles += 1;
            }
            summary.last = Some(report);
            on_cycle(&report);

            let now = self.clock.now();
            if now > deadline {
                summary.overruns += 1;
                // resynchronize instead of bursting to catch up
                deadline = now + period;
            } else {
                self.clock.sleep_until(deadline);
                deadline += period;
            }
        }

        info!(
            cycles = summary.cycles,
            faulty = summary.faulty_cycles,
            overruns = summary.overruns,
            "control loop done"
        );
        Ok(summary)
    }
}

impl<A, F, C> core::fmt::Debug for ControlLoop<A, F, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("cycle", &self.cycle)
            .field("pedal", &self.pedal)
            .finish()
    }
}
