pub mod config;
pub mod console;
pub mod controller;
pub mod game;
pub mod haptics;

use crate::config::{AppConfig, CONTROLLER_SLOT};
use crate::controller::{ControllerSource, GamepadController, UnavailableController};
use crate::game::{ChallengeGenerator, Session, SessionError};
use color_eyre::Result;
use std::io;
use std::process::ExitCode;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    setup()?;

    let config_path = config::config_path();
    let loaded = AppConfig::load_from(&config_path).await?;
    let config = loaded.clone().unwrap_or_default();
    setup_logging_env(config.level().unwrap_or(Level::WARN));

    match loaded {
        Some(_) => info!("Loaded config from {}", config_path.display()),
        None => debug!("No config file at {}, using defaults", config_path.display()),
    }
    if config.level().is_none() {
        warn!("Unknown log level {:?}, using warn", config.log_level);
    }
    info!("Starting with config: {:?}", config);

    let mut out = io::stdout();
    console::banner(&mut out)?;

    let controller: Box<dyn ControllerSource> =
        match GamepadController::open(CONTROLLER_SLOT, config.rumble) {
            Ok(controller) => Box::new(controller),
            Err(e) => {
                error!("Failed to open controller: {}", e);
                Box::new(UnavailableController::new(e.to_string()))
            }
        };

    let session = Session::create(controller, ChallengeGenerator::from_entropy());
    let running = match session.connect(&mut out) {
        Ok(running) => running,
        Err(SessionError::ControllerNotConnected(slot)) => {
            error!("No controller connected in slot {}, exiting", slot);
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e.into()),
    };

    let finished = running.run(&mut out).await?;
    finished.report(&mut out)?;

    if let Some(summary) = finished.summary() {
        if summary.late_frames > 0 {
            info!(
                "{} of {} frames missed their deadline",
                summary.late_frames, summary.ticks
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    Ok(())
}

// Stdout carries the game, logs go to stderr
fn setup_logging_env(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(io::stderr)
        .pretty()
        .init();
}
