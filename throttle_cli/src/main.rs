mod cli;
mod error_fmt;
mod logging;
mod run;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        tracing::error!(error = %e, "throttle exited with error");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = run::load_config(&cli.config)?;
    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    logging::init_tracing(cli.json, level, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Run {
            cycles,
            speed,
            pedal,
            stats,
        } => {
            let torque = run::torque_map(&cfg, cli.torque_map.as_deref())?;
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .wrap_err("installing Ctrl-C handler")?;
            run::run_loop(&cfg, torque, cycles, speed, pedal, stats, cli.json, shutdown)?;
        }
        Commands::Torque { throttle, speed } => {
            let torque = run::torque_map(&cfg, cli.torque_map.as_deref())?;
            run::run_torque(&torque, throttle, speed, cli.json)?;
        }
        Commands::SelfCheck => {
            if let Some(path) = cli.torque_map.as_deref() {
                run::torque_map(&cfg, Some(path))?;
            }
            run::self_check(&cfg, cli.json)?;
        }
    }
    Ok(())
}
