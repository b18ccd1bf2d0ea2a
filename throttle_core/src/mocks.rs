//! Test and helper mocks for throttle_core

use throttle_traits::{Adc, BoxError, ChannelId, FaultIndicator};

/// An ADC whose channels never initialize; drives the fatal construction path.
pub struct DeadAdc;

impl Adc for DeadAdc {
    fn init(&mut self, channel: ChannelId) -> Result<(), BoxError> {
        Err(Box::new(std::io::Error::other(format!(
            "channel {channel} not present"
        ))))
    }

    fn read(&mut self, channel: ChannelId) -> Result<u32, BoxError> {
        Err(Box::new(std::io::Error::other(format!(
            "channel {channel} not present"
        ))))
    }
}

/// Fault indicator that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullIndicator;

impl FaultIndicator for NullIndicator {
    fn init(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    fn set(&mut self, _active: bool) -> Result<(), BoxError> {
        Ok(())
    }
}
