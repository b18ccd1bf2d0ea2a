#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and torque-map parsing for the throttle pipeline.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - The torque map can also come from a CSV file with strict headers.
use serde::Deserialize;
use serde::de::Deserializer;

/// Torque-map CSV schema.
///
/// Expected headers:
/// throttle,torque_0,torque_ref
///
/// Example:
/// throttle,torque_0,torque_ref
/// 0.0,0,-30
/// 1.0,120,120
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TorquePoint {
    pub throttle: f32,
    /// Torque at standstill.
    pub torque_0: f32,
    /// Torque at `torque.reference_speed_kmh`.
    pub torque_ref: f32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Inject 0.0 into the window on a bad sample.
    #[default]
    Zero,
    /// Re-inject the last valid position on a bad sample.
    HoldLast,
}

/// Cross-sensor reduction. Accepts `"average"`, `"median"` or
/// `{ vote = { threshold = 0.1 } }`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    #[default]
    Average,
    Median,
    Vote { threshold: f32 },
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PedalCfg {
    /// Pedal travel in angle units; readings above it are invalid.
    pub max_angle: f32,
    /// Moving-average depth per sensor.
    pub window: usize,
    pub fault_policy: FaultPolicy,
    pub reduction: Reduction,
}

impl Default for PedalCfg {
    fn default() -> Self {
        Self {
            max_angle: 30.0,
            window: 5,
            fault_policy: FaultPolicy::Zero,
            reduction: Reduction::Average,
        }
    }
}

/// One pedal sensor: `angle = (raw - offset) / scale`.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SensorCfg {
    pub channel: u8,
    pub offset: f32,
    pub scale: f32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TorqueCfg {
    /// Speed of the second torque column (km/h).
    pub reference_speed_kmh: f32,
    pub min_speed_kmh: f32,
    pub max_speed_kmh: f32,
    /// Accepts either:
    /// - array of tuples: [[0.0, 0.0, -30.0], ...]
    /// - array of tables: [{ throttle = 0.0, torque_0 = 0.0, torque_ref = -30.0 }, ...]
    #[serde(deserialize_with = "de_torque_points")]
    pub points: Vec<TorquePoint>,
}

impl Default for TorqueCfg {
    fn default() -> Self {
        Self {
            reference_speed_kmh: 50.0,
            min_speed_kmh: -25.0,
            max_speed_kmh: 250.0,
            points: reference_points(),
        }
    }
}

/// The reference torque calibration: (throttle, Nm at 0 km/h, Nm at 50 km/h).
pub fn reference_points() -> Vec<TorquePoint> {
    [
        (0.00, 0.0, -30.0),
        (0.10, 18.0, -10.0),
        (0.20, 35.0, 10.0),
        (0.30, 50.0, 30.0),
        (0.40, 62.0, 45.0),
        (0.60, 82.0, 72.0),
        (0.80, 103.0, 95.0),
        (1.00, 120.0, 120.0),
    ]
    .into_iter()
    .map(|(throttle, torque_0, torque_ref)| TorquePoint {
        throttle,
        torque_0,
        torque_ref,
    })
    .collect()
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlCfg {
    /// Control-cycle period in milliseconds.
    pub period_ms: u64,
    /// Placeholder vehicle speed until a real speed source exists.
    pub vehicle_speed_kmh: f32,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            period_ms: 10,
            vehicle_speed_kmh: 50.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hardware {
    /// Channels exposed by the simulated ADC.
    pub adc_channels: u8,
}

impl Default for Hardware {
    fn default() -> Self {
        Self { adc_channels: 2 }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pedal: PedalCfg,
    pub sensors: Vec<SensorCfg>,
    #[serde(default)]
    pub torque: TorqueCfg,
    #[serde(default)]
    pub control: ControlCfg,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub hardware: Hardware,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PointToml {
    Tuple((f32, f32, f32)),
    Table {
        throttle: f32,
        torque_0: f32,
        torque_ref: f32,
    },
}

fn de_torque_points<'de, D>(deserializer: D) -> Result<Vec<TorquePoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<PointToml> = Vec::deserialize(deserializer)?;
    Ok(items
        .into_iter()
        .map(|p| match p {
            PointToml::Tuple((throttle, torque_0, torque_ref)) => TorquePoint {
                throttle,
                torque_0,
                torque_ref,
            },
            PointToml::Table {
                throttle,
                torque_0,
                torque_ref,
            } => TorquePoint {
                throttle,
                torque_0,
                torque_ref,
            },
        })
        .collect())
}

/// Check the shape rules every torque table must satisfy.
pub fn validate_points(points: &[TorquePoint]) -> eyre::Result<()> {
    if points.len() < 2 {
        eyre::bail!("torque table requires at least two points, got {}", points.len());
    }
    for (i, p) in points.iter().enumerate() {
        if !(p.throttle.is_finite() && p.torque_0.is_finite() && p.torque_ref.is_finite()) {
            eyre::bail!("torque point {} has non-finite values", i);
        }
    }
    for i in 1..points.len() {
        if points[i].throttle < points[i - 1].throttle {
            eyre::bail!(
                "torque table throttle must be non-decreasing (index {} < index {})",
                i,
                i - 1
            );
        }
    }
    let first = points[0].throttle;
    let last = points[points.len() - 1].throttle;
    if first != 0.0 {
        eyre::bail!("torque table must start at throttle 0.0, got {first}");
    }
    if last != 1.0 {
        eyre::bail!("torque table must end at throttle 1.0, got {last}");
    }
    Ok(())
}

pub fn load_torque_csv(path: &std::path::Path) -> eyre::Result<Vec<TorquePoint>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open torque map CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["throttle", "torque_0", "torque_ref"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "torque map CSV must have headers 'throttle,torque_0,torque_ref', got: {}",
            actual.join(",")
        );
    }

    let mut points = Vec::new();
    for (idx, rec) in rdr.deserialize::<TorquePoint>().enumerate() {
        match rec {
            Ok(p) => points.push(p),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    validate_points(&points)?;
    Ok(points)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pedal
        if !(self.pedal.max_angle.is_finite() && self.pedal.max_angle > 0.0) {
            eyre::bail!("pedal.max_angle must be > 0");
        }
        if self.pedal.window == 0 {
            eyre::bail!("pedal.window must be >= 1");
        }
        if let Reduction::Vote { threshold } = self.pedal.reduction
            && !(threshold.is_finite() && threshold >= 0.0)
        {
            eyre::bail!("pedal.reduction.vote.threshold must be >= 0");
        }

        // Sensors
        if self.sensors.is_empty() {
            eyre::bail!("at least one [[sensors]] entry is required");
        }
        for (i, s) in self.sensors.iter().enumerate() {
            if !s.offset.is_finite() {
                eyre::bail!("sensors[{i}].offset must be finite");
            }
            if !s.scale.is_finite() || s.scale == 0.0 {
                eyre::bail!("sensors[{i}].scale must be finite and != 0");
            }
            if self.sensors[..i].iter().any(|o| o.channel == s.channel) {
                eyre::bail!("sensors[{i}].channel {} is used twice", s.channel);
            }
        }

        // Torque
        let t = &self.torque;
        if !(t.reference_speed_kmh.is_finite() && t.reference_speed_kmh > 0.0) {
            eyre::bail!("torque.reference_speed_kmh must be > 0");
        }
        if !(t.min_speed_kmh.is_finite() && t.max_speed_kmh.is_finite()) {
            eyre::bail!("torque speed limits must be finite");
        }
        if t.min_speed_kmh >= t.max_speed_kmh {
            eyre::bail!("torque.min_speed_kmh must be < torque.max_speed_kmh");
        }
        validate_points(&t.points)?;

        // Control
        if self.control.period_ms == 0 {
            eyre::bail!("control.period_ms must be >= 1");
        }
        if self.control.period_ms > 1_000 {
            eyre::bail!("control.period_ms is unreasonably large (>1s)");
        }
        if !self.control.vehicle_speed_kmh.is_finite() {
            eyre::bail!("control.vehicle_speed_kmh must be finite");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot}");
        }

        // Hardware
        if self.hardware.adc_channels == 0 {
            eyre::bail!("hardware.adc_channels must be >= 1");
        }

        Ok(())
    }
}
