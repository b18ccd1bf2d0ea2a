//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Env override for the simulated pedal angle when `--pedal` is absent.
pub const SIM_PEDAL_ENV: &str = "THROTTLE_SIM_PEDAL_DEG";

#[derive(Parser, Debug)]
#[command(name = "throttle", version, about = "Throttle pedal to motor torque controller")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/throttle_config.toml")]
    pub config: PathBuf,

    /// Optional torque map CSV (strict header), replaces torque.points
    #[arg(long = "torque-map", value_name = "FILE")]
    pub torque_map: Option<PathBuf>,

    /// Print JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); defaults to logging.level, then info
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control loop against the simulated pedal
    Run {
        /// Stop after this many cycles (default: until Ctrl-C)
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,
        /// Vehicle speed in km/h (default: control.vehicle_speed_kmh)
        #[arg(long, value_name = "KMH", allow_hyphen_values = true)]
        speed: Option<f32>,
        /// Simulated pedal angle in degrees
        #[arg(long, value_name = "ANGLE")]
        pedal: Option<f32>,
        /// Print loop timing stats to stderr
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
    },
    /// Evaluate the torque map once
    Torque {
        /// Throttle position in [0.0, 1.0]
        #[arg(long, allow_hyphen_values = true)]
        throttle: f32,
        /// Vehicle speed in km/h
        #[arg(long, allow_hyphen_values = true)]
        speed: f32,
    },
    /// Validate config and initialize every channel and the fault indicator
    SelfCheck,
}
