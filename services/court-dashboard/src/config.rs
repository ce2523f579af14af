//! Configuration types for the court dashboard service

use std::path::Path;
use std::time::Duration;

use court_api::{DEFAULT_BASE_URL, DEFAULT_UPCOMING_DAYS};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Backend connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Background refresh cadence, written as humantime strings ("30s", "2m")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_health_interval", with = "humantime_serde")]
    pub health_interval: Duration,
    #[serde(default = "default_scheduler_status_interval", with = "humantime_serde")]
    pub scheduler_status_interval: Duration,
    #[serde(default = "default_gc_interval", with = "humantime_serde")]
    pub gc_interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            health_interval: default_health_interval(),
            scheduler_status_interval: default_scheduler_status_interval(),
            gc_interval: default_gc_interval(),
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_dashboard_port(),
            upcoming_days: default_upcoming_days(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_health_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_scheduler_status_interval() -> Duration {
    Duration::from_secs(120)
}

fn default_gc_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_true() -> bool {
    true
}

fn default_dashboard_port() -> u16 {
    11120
}

fn default_upcoming_days() -> u32 {
    DEFAULT_UPCOMING_DAYS
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::DashboardError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
