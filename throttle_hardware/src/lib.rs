//! Simulated acquisition and fault-indicator backends.
//!
//! Both simulations are cheap cloneable handles over shared state: move one
//! clone into the pipeline and keep another to inject readings or observe the
//! indicator.
pub mod error;

use std::sync::{Arc, Mutex, MutexGuard};

use throttle_traits::{Adc, BoxError, ChannelId, FaultIndicator};
use tracing::{debug, error, info, trace};

use crate::error::{HwError, Result};

/// Status the simulated driver reports for a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdcStatus {
    #[default]
    Ok,
    Nok,
}

#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    value: u32,
    status: AdcStatus,
    initialized: bool,
    reads: u64,
}

/// In-memory ADC with a test-injection hook.
///
/// Every channel starts at value 0 with status OK. Reads return whatever was
/// last injected until the injection changes.
#[derive(Debug, Clone)]
pub struct SimulatedAdc {
    channels: Arc<Mutex<Vec<ChannelState>>>,
}

impl SimulatedAdc {
    pub fn new(num_channels: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(vec![ChannelState::default(); num_channels])),
        }
    }

    pub fn num_channels(&self) -> usize {
        self.lock().len()
    }

    /// Pin the value and status returned by subsequent reads of `channel`.
    pub fn set_injected_output(
        &self,
        channel: ChannelId,
        value: u32,
        status: AdcStatus,
    ) -> Result<()> {
        let mut channels = self.lock();
        let Some(state) = channels.get_mut(usize::from(channel)) else {
            error!(channel, "set_injected_output: invalid channel");
            return Err(HwError::InvalidChannel(channel));
        };
        state.value = value;
        state.status = status;
        Ok(())
    }

    pub fn is_initialized(&self, channel: ChannelId) -> bool {
        self.lock()
            .get(usize::from(channel))
            .is_some_and(|s| s.initialized)
    }

    /// Number of reads served on `channel` so far (valid channels only).
    pub fn read_count(&self, channel: ChannelId) -> u64 {
        self.lock()
            .get(usize::from(channel))
            .map_or(0, |s| s.reads)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ChannelState>> {
        self.channels.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn init_channel(&self, channel: ChannelId) -> Result<()> {
        let mut channels = self.lock();
        let Some(state) = channels.get_mut(usize::from(channel)) else {
            error!(channel, "adc init: invalid channel");
            return Err(HwError::InvalidChannel(channel));
        };
        state.initialized = true;
        debug!(channel, "adc channel initialized");
        Ok(())
    }

    fn read_channel(&self, channel: ChannelId) -> Result<u32> {
        let mut channels = self.lock();
        let Some(state) = channels.get_mut(usize::from(channel)) else {
            error!(channel, "adc read: invalid channel");
            return Err(HwError::InvalidChannel(channel));
        };
        state.reads += 1;
        trace!(channel, value = state.value, status = ?state.status, "adc read");
        match state.status {
            AdcStatus::Ok => Ok(state.value),
            AdcStatus::Nok => Err(HwError::ReadFailed(channel)),
        }
    }
}

impl Adc for SimulatedAdc {
    fn init(&mut self, channel: ChannelId) -> std::result::Result<(), BoxError> {
        Ok(self.init_channel(channel)?)
    }

    fn read(&mut self, channel: ChannelId) -> std::result::Result<u32, BoxError> {
        Ok(self.read_channel(channel)?)
    }
}

/// Raw count an ideal sensor with the given calibration produces at `angle`.
///
/// Inverse of `angle = (raw - offset) / scale`, rounded to the nearest count
/// and saturated to the `u32` range.
pub fn raw_for_angle(offset: f32, scale: f32, angle: f32) -> u32 {
    let raw = (offset + scale * angle).round();
    if !raw.is_finite() || raw <= 0.0 {
        0
    } else if raw >= u32::MAX as f32 {
        u32::MAX
    } else {
        raw as u32
    }
}

#[derive(Debug, Default)]
struct LedState {
    initialized: bool,
    active: bool,
    transitions: u64,
}

/// Fault LED that only logs and remembers its state.
#[derive(Debug, Clone, Default)]
pub struct SimulatedFaultLed {
    state: Arc<Mutex<LedState>>,
}

impl SimulatedFaultLed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    /// Number of off→on or on→off changes seen since construction.
    pub fn transitions(&self) -> u64 {
        self.lock().transitions
    }

    fn lock(&self) -> MutexGuard<'_, LedState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl FaultIndicator for SimulatedFaultLed {
    fn init(&mut self) -> std::result::Result<(), BoxError> {
        let mut s = self.lock();
        s.initialized = true;
        s.active = false;
        debug!("fault led initialized");
        Ok(())
    }

    fn set(&mut self, active: bool) -> std::result::Result<(), BoxError> {
        let mut s = self.lock();
        if s.active != active {
            s.transitions += 1;
            info!(active, "fault led changed");
        }
        s.active = active;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reads_zero_ok() {
        let mut adc = SimulatedAdc::new(2);
        adc.init(0).unwrap();
        assert_eq!(adc.read(0).unwrap(), 0);
        assert_eq!(adc.read_count(0), 1);
    }

    #[test]
    fn injected_nok_fails_read() {
        let mut adc = SimulatedAdc::new(2);
        adc.set_injected_output(1, 42, AdcStatus::Nok).unwrap();
        let err = adc.read(1).unwrap_err();
        assert!(err.to_string().contains("channel 1"));
    }

    #[test]
    fn invalid_channel_is_rejected_everywhere() {
        let mut adc = SimulatedAdc::new(2);
        assert!(adc.init(2).is_err());
        assert!(adc.read(7).is_err());
        assert!(matches!(
            adc.set_injected_output(2, 1, AdcStatus::Ok),
            Err(HwError::InvalidChannel(2))
        ));
    }

    #[test]
    fn led_counts_transitions_only() {
        let mut led = SimulatedFaultLed::new();
        led.init().unwrap();
        led.set(true).unwrap();
        led.set(true).unwrap();
        led.set(false).unwrap();
        assert!(!led.is_active());
        assert_eq!(led.transitions(), 2);
    }
}
