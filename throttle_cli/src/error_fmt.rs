//! Human-readable error descriptions and structured JSON error formatting.

use throttle_core::error::{BuildError, ThrottleError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::NoSensors => {
                "What happened: No pedal sensors were configured.\nLikely causes: The config has no [[sensors]] entries.\nHow to fix: Add one [[sensors]] table per ADC channel (channel, offset, scale).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/throttle_config.toml for a sample."
            ),
        };
    }

    if let Some(te) = err.downcast_ref::<ThrottleError>() {
        return match te {
            ThrottleError::ChannelInit { channel, reason } => format!(
                "What happened: ADC channel {channel} could not be initialized ({reason}).\nLikely causes: The sensor channel is not wired or exceeds hardware.adc_channels.\nHow to fix: Check the [[sensors]] channels against the [hardware] section."
            ),
            ThrottleError::ThrottleOutOfRange(t) => format!(
                "What happened: The torque map was asked for throttle {t}, outside [0.0, 1.0].\nLikely causes: A pedal reducer or caller produced an invalid position.\nHow to fix: The control loop was stopped; fix the throttle source before restarting."
            ),
            ThrottleError::Indicator(msg) => format!(
                "What happened: The fault indicator failed to initialize ({msg}).\nLikely causes: Indicator driver missing.\nHow to fix: Check the indicator wiring and rerun self-check."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("torque map csv must have headers") {
        return "Invalid headers in torque map CSV. Expected 'throttle,torque_0,torque_ref'.".to_string();
    }

    if lower.contains("invalid config") || lower.contains("parse config") {
        let cause = err.source().map(|s| format!(" ({s})")).unwrap_or_default();
        return format!(
            "What happened: Configuration is invalid{cause}.\nLikely causes: A missing [[sensors]] entry or an out-of-range value.\nHow to fix: Edit the TOML config and try again."
        );
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable machine-readable name of the error class.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "InvalidConfig";
    }
    match err.downcast_ref::<ThrottleError>() {
        Some(ThrottleError::ChannelInit { .. } | ThrottleError::InvalidChannel(_)) => "ChannelInit",
        Some(ThrottleError::ThrottleOutOfRange(_)) => "ThrottleOutOfRange",
        Some(ThrottleError::Indicator(_)) => "Indicator",
        Some(ThrottleError::Config(_)) => "InvalidConfig",
        Some(ThrottleError::Hardware(_)) => "Hardware",
        None => "Error",
    }
}

/// 3 = channel init failure, 4 = throttle contract violation, 1 otherwise.
/// Usage errors exit with 2 from clap before any of this runs.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<ThrottleError>() {
        Some(ThrottleError::ChannelInit { .. } | ThrottleError::InvalidChannel(_)) => 3,
        Some(ThrottleError::ThrottleOutOfRange(_)) => 4,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
