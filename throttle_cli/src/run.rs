//! Command implementations: config mapping, simulated hardware assembly and the loop.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use eyre::WrapErr;
use serde_json::json;
use throttle_config::Config;
use throttle_core::{ControlLoop, CycleReport, RunParams, RunSummary, TorqueCommand, TorqueMap};
use throttle_hardware::{AdcStatus, SimulatedAdc, SimulatedFaultLed, raw_for_angle};
use throttle_traits::MonotonicClock;

use crate::cli::SIM_PEDAL_ENV;

pub fn load_config(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config file {}", path.display()))?;
    let cfg = throttle_config::load_toml(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate().wrap_err("invalid config")?;
    Ok(cfg)
}

/// Torque map from config, with its points optionally replaced by a CSV table.
pub fn torque_map(cfg: &Config, csv: Option<&Path>) -> eyre::Result<TorqueMap> {
    match csv {
        Some(path) => {
            let points = throttle_config::load_torque_csv(path)?;
            tracing::info!(path = %path.display(), points = points.len(), "torque map loaded from CSV");
            throttle_core::torque_map_from_points(&cfg.torque, &points)
        }
        None => throttle_core::torque_map_from_points(&cfg.torque, &cfg.torque.points),
    }
}

/// Simulated ADC sized from `[hardware]`, every sensor pinned to `angle` degrees.
pub fn simulated_adc(cfg: &Config, angle: f32) -> SimulatedAdc {
    let adc = SimulatedAdc::new(usize::from(cfg.hardware.adc_channels));
    for s in &cfg.sensors {
        let raw = raw_for_angle(s.offset, s.scale, angle);
        // channels beyond the simulated ADC surface as init failures later
        if adc.set_injected_output(s.channel, raw, AdcStatus::Ok).is_ok() {
            tracing::debug!(channel = s.channel, raw, angle, "simulated sensor output");
        }
    }
    adc
}

fn pedal_angle(flag: Option<f32>) -> eyre::Result<f32> {
    if let Some(a) = flag {
        return Ok(a);
    }
    match std::env::var(SIM_PEDAL_ENV) {
        Ok(v) => v
            .trim()
            .parse::<f32>()
            .wrap_err_with(|| format!("{SIM_PEDAL_ENV}={v:?} is not a number")),
        Err(_) => Ok(0.0),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run_loop(
    cfg: &Config,
    torque: TorqueMap,
    cycles: Option<u64>,
    speed: Option<f32>,
    pedal: Option<f32>,
    stats: bool,
    json_out: bool,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<RunSummary> {
    let angle = pedal_angle(pedal)?;
    let speed = speed.unwrap_or(cfg.control.vehicle_speed_kmh);
    let adc = simulated_adc(cfg, angle);
    let (pedal, _) = throttle_core::from_config(cfg, adc)?;
    let mut lp = ControlLoop::new(
        pedal,
        Arc::new(torque),
        SimulatedFaultLed::new(),
        MonotonicClock::new(),
    )?;

    let period = Duration::from_millis(cfg.control.period_ms);
    let params = RunParams {
        period,
        max_cycles: cycles,
    };
    tracing::info!(angle, speed, ?cycles, "run start");

    let mut intervals: Vec<u64> = Vec::new();
    let mut last_tick: Option<Instant> = None;
    let summary = lp.run(params, &shutdown, || speed, |report| {
        if stats {
            let now = Instant::now();
            if let Some(prev) = last_tick.replace(now) {
                intervals.push(now.duration_since(prev).as_micros() as u64);
            }
        }
        print_report(report, json_out);
    })?;

    if stats {
        print_stats(&intervals, &summary, period);
    }
    if json_out {
        println!(
            "{}",
            json!({
                "summary": true,
                "cycles": summary.cycles,
                "faulty_cycles": summary.faulty_cycles,
                "overruns": summary.overruns,
            })
        );
    } else {
        println!(
            "run complete: {} cycles, {} faulty, {} overruns",
            summary.cycles, summary.faulty_cycles, summary.overruns
        );
    }
    Ok(summary)
}

fn print_report(r: &CycleReport, json_out: bool) {
    if json_out {
        println!("{}", report_json(r));
        return;
    }
    let status = if r.ok { "ok" } else { "FAULT" };
    match r.torque {
        TorqueCommand::Applied(t) => println!(
            "cycle {}: throttle {:.3} speed {:.1} km/h torque {:.2} Nm [{status}]",
            r.cycle, r.throttle, r.speed, t
        ),
        TorqueCommand::SpeedOutOfRange { speed } => println!(
            "cycle {}: throttle {:.3} speed {speed:.1} km/h out of range, torque 0 [{status}]",
            r.cycle, r.throttle
        ),
    }
}

pub fn report_json(r: &CycleReport) -> serde_json::Value {
    json!({
        "cycle": r.cycle,
        "ok": r.ok,
        "throttle": r.throttle,
        "consistent": r.consistent,
        "speed_kmh": r.speed,
        "torque_nm": r.torque.value(),
        "status": torque_status(&r.torque),
    })
}

fn torque_status(t: &TorqueCommand) -> &'static str {
    match t {
        TorqueCommand::Applied(_) => "applied",
        TorqueCommand::SpeedOutOfRange { .. } => "speed_out_of_range",
    }
}

pub fn run_torque(map: &TorqueMap, throttle: f32, speed: f32, json_out: bool) -> eyre::Result<()> {
    let cmd = map
        .torque(throttle, speed)
        .map_err(eyre::Report::new)
        .wrap_err("torque request")?;
    if json_out {
        println!(
            "{}",
            json!({
                "throttle": throttle,
                "speed_kmh": speed,
                "torque_nm": cmd.value(),
                "status": torque_status(&cmd),
            })
        );
    } else {
        match cmd {
            TorqueCommand::Applied(t) => println!("torque: {t:.2} Nm"),
            TorqueCommand::SpeedOutOfRange { speed } => println!(
                "speed {speed} km/h outside [{}, {}]: torque 0 Nm",
                map.limits().min_reverse,
                map.limits().max_forward
            ),
        }
    }
    Ok(())
}

pub fn self_check(cfg: &Config, json_out: bool) -> eyre::Result<()> {
    let adc = simulated_adc(cfg, 0.0);
    let (pedal, torque) = throttle_core::from_config(cfg, adc)?;
    let channels: Vec<u8> = pedal.sensors().iter().map(|s| s.channel()).collect();
    let mut lp = ControlLoop::new(
        pedal,
        Arc::new(torque),
        SimulatedFaultLed::new(),
        MonotonicClock::new(),
    )?;
    let report = lp.step(cfg.control.vehicle_speed_kmh)?;
    tracing::info!(?channels, ok = report.ok, "self-check done");

    if json_out {
        println!(
            "{}",
            json!({ "self_check": "ok", "channels": channels, "sample_ok": report.ok })
        );
    } else {
        println!("self-check ok: {} channel(s) {:?}", channels.len(), channels);
    }
    Ok(())
}

/// Print cycle-to-cycle timing stats to stderr.
fn print_stats(intervals: &[u64], summary: &RunSummary, period: Duration) {
    let min = intervals.iter().min().copied().unwrap_or(0);
    let max = intervals.iter().max().copied().unwrap_or(0);
    let avg = if intervals.is_empty() {
        0.0
    } else {
        intervals.iter().sum::<u64>() as f64 / intervals.len() as f64
    };
    let stdev = if intervals.len() > 1 {
        let var = intervals
            .iter()
            .map(|&x| (x as f64 - avg).powi(2))
            .sum::<f64>()
            / (intervals.len() as f64 - 1.0);
        var.sqrt()
    } else {
        0.0
    };
    eprintln!("\n--- Throttle Loop Stats ---");
    eprintln!("Cycles: {} ({} faulty)", summary.cycles, summary.faulty_cycles);
    eprintln!("Period (us): {}", period.as_micros());
    eprintln!("Interval min/avg/max/stdev (us): {min} / {avg:.1} / {max} / {stdev:.1}");
    eprintln!("Overruns: {}", summary.overruns);
    eprintln!("---------------------------\n");
}
