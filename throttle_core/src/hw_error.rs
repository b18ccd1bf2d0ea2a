//! Maps `Box<dyn Error>` from trait boundaries to typed `ThrottleError`.
//!
//! The traits in `throttle_traits` use `Box<dyn Error + Send + Sync>`; this
//! module converts those to our typed error enum, with an optional
//! feature-gated path for `throttle_hardware::HwError` downcasting.

use crate::error::ThrottleError;

/// Map a trait-boundary error to a typed `ThrottleError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> ThrottleError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<throttle_hardware::error::HwError>() {
            return match hw {
                throttle_hardware::error::HwError::InvalidChannel(ch) => {
                    ThrottleError::InvalidChannel(*ch)
                }
                other => ThrottleError::Hardware(other.to_string()),
            };
        }
    }

    ThrottleError::Hardware(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_errors_become_hardware() {
        let e = std::io::Error::other("bus glitch");
        assert_eq!(
            map_hw_error(&e),
            ThrottleError::Hardware("bus glitch".into())
        );
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn invalid_channel_is_downcast() {
        let e = throttle_hardware::error::HwError::InvalidChannel(9);
        assert_eq!(map_hw_error(&e), ThrottleError::InvalidChannel(9));
    }
}
