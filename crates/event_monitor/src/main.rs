//! Event monitor entry point.
//!
//! Loads configuration, sets up logging, and runs the monitor until it is
//! told to stop.

mod app;
mod cli;
mod config;
mod logging;
mod signals;

use anyhow::Result;
use app::MonitorApp;
use cli::CliArgs;
use config::MonitorConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let mut config = MonitorConfig::load_from_file(&args.config_path).await?;
    config.apply_cli(&args);
    config.validate()?;

    logging::setup_logging(&config.logging)?;
    info!("🚀 Starting event monitor with config {}", args.config_path.display());

    let app = MonitorApp::new(config)?;
    info!("🧵 Dispatch worker state: {:?}", app.manager().worker_state());
    let summary = app.run(args.duration).await?;

    info!("📊 Final statistics:\n{}", serde_json::to_string_pretty(&summary)?);
    info!("✅ Event monitor stopped");
    Ok(())
}
