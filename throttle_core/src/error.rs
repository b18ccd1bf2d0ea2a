use thiserror::Error;

use throttle_traits::ChannelId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThrottleError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("failed to initialize adc channel {channel}: {reason}")]
    ChannelInit { channel: ChannelId, reason: String },
    #[error("invalid adc channel {0}")]
    InvalidChannel(ChannelId),
    #[error("throttle {0} outside [0.0, 1.0]")]
    ThrottleOutOfRange(f32),
    #[error("fault indicator error: {0}")]
    Indicator(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl ThrottleError {
    /// Fatal-class errors must stop the control loop; everything else is
    /// cycle-local.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ChannelInit { .. }
                | Self::InvalidChannel(_)
                | Self::ThrottleOutOfRange(_)
                | Self::Config(_)
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("no pedal sensors configured")]
    NoSensors,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
