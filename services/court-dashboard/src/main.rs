//! Court Dashboard CLI
//!
//! Command-line interface for the tennis court booking dashboard.

use std::path::PathBuf;

use clap::Parser;
use court_dashboard::{load_config, Config, DashboardBuilder};
use tracing::Level;

#[derive(Parser)]
#[command(name = "court-dashboard")]
#[command(about = "Dashboard for tennis court booking schedules")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scheduler backend URL (overrides config file)
    #[arg(long)]
    base_url: Option<String>,

    /// Dashboard port (overrides config file)
    #[arg(long)]
    dashboard_port: Option<u16>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, base_url={:?}, dashboard_port={:?}, log_level={:?}",
        args.config,
        args.base_url,
        args.dashboard_port,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(base_url) = args.base_url {
        config.api.base_url = base_url;
    }
    if let Some(dashboard_port) = args.dashboard_port {
        config.dashboard.port = dashboard_port;
    }

    tracing::info!("Starting court dashboard");
    tracing::debug!(
        "Health poll: {:?}, scheduler status poll: {:?}, dashboard enabled: {}",
        config.polling.health_interval,
        config.polling.scheduler_status_interval,
        config.dashboard.enabled
    );

    DashboardBuilder::new(config).build().await?.start().await?;

    Ok(())
}
