use thiserror::Error;

use throttle_traits::ChannelId;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("invalid adc channel {0}")]
    InvalidChannel(ChannelId),
    #[error("adc read failed on channel {0}")]
    ReadFailed(ChannelId),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
