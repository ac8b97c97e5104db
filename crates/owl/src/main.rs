//! owl - GPU Lucas-Lehmer primality test launcher
//!
//! Resolves the run configuration from the command line, checked against the
//! compute devices present on this machine, and logs it before any work is
//! scheduled.

use anyhow::Result;
use owl_core::args::{Resolution, StopReason, resolve};
use owl_core::home::get_home_dir;
use owl_core::logging;
use owl_core::settings::resolve_settings;
use std::process::ExitCode;
use tracing::info;

/// Exit status for arguments that were not accepted
const EXIT_INVALID_ARGS: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let home_dir = get_home_dir()?;
    let current_dir = std::env::current_dir()?;
    let loaded = resolve_settings(&current_dir, &home_dir)?;
    logging::init(&loaded.settings.logging);
    loaded.log_warnings();

    let devices = loaded.settings.devices.backend();
    let tokens = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned());

    match resolve(tokens, &devices) {
        Resolution::Resolved(config) => {
            info!(
                device = config.device_index(),
                self_test = config.self_test(),
                "configuration resolved"
            );
            Ok(ExitCode::SUCCESS)
        }
        Resolution::Stop(StopReason::Help) => Ok(ExitCode::SUCCESS),
        Resolution::Stop(StopReason::Invalid(_)) => Ok(ExitCode::from(EXIT_INVALID_ARGS)),
    }
}
