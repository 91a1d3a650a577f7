#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

use anyhow::Result;
use river_sweep::{app::App, config::GameConfig, constants::LOOP_TIME};
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// The main entry point of the application.
///
/// Installs logging, loads the configuration, and runs the game loop until the game asks to
/// exit.
pub fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .init();

    let config = GameConfig::load()?;
    for problem in config.validate() {
        warn!(%problem, "Configuration problem");
    }

    let mut app = App::new(config)?;

    info!(loop_time = ?LOOP_TIME, "Starting game loop");
    while app.run() {}

    info!("Exiting");
    Ok(())
}
