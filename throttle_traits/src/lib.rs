//! Hardware seam for the throttle pipeline.
//!
//! The core only ever talks to sensors and outputs through these traits.
//! Errors cross the boundary as boxed trait objects; `throttle_core` maps them
//! back to typed errors.
pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Error type used at every trait boundary in this crate.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Identifier of one analog acquisition channel.
pub type ChannelId = u8;

/// Analog-to-digital acquisition subsystem.
///
/// `Err` corresponds to a NOK status from the driver; the value is only
/// meaningful on `Ok`.
pub trait Adc {
    fn init(&mut self, channel: ChannelId) -> Result<(), BoxError>;
    fn read(&mut self, channel: ChannelId) -> Result<u32, BoxError>;
}

/// Boolean fault output (e.g. a dashboard LED).
pub trait FaultIndicator {
    fn init(&mut self) -> Result<(), BoxError>;
    fn set(&mut self, active: bool) -> Result<(), BoxError>;
}

impl<T: Adc + ?Sized> Adc for &mut T {
    fn init(&mut self, channel: ChannelId) -> Result<(), BoxError> {
        (**self).init(channel)
    }
    fn read(&mut self, channel: ChannelId) -> Result<u32, BoxError> {
        (**self).read(channel)
    }
}

impl<T: Adc + ?Sized> Adc for Box<T> {
    fn init(&mut self, channel: ChannelId) -> Result<(), BoxError> {
        (**self).init(channel)
    }
    fn read(&mut self, channel: ChannelId) -> Result<u32, BoxError> {
        (**self).read(channel)
    }
}

impl<T: FaultIndicator + ?Sized> FaultIndicator for Box<T> {
    fn init(&mut self) -> Result<(), BoxError> {
        (**self).init()
    }
    fn set(&mut self, active: bool) -> Result<(), BoxError> {
        (**self).set(active)
    }
}
