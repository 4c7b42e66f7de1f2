//! User configuration management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use super::watcher::MIN_SCAN_INTERVAL;
use super::{get_app_dir, DisplayMode};
use crate::alert::{AlertBackend, NotifiedPolicy};

pub const DEFAULT_SCAN_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub alerts: AlertsConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_scan_interval")]
    pub scan_interval_ms: u64,

    #[serde(default)]
    pub notified_policy: NotifiedPolicy,

    #[serde(default)]
    pub backend: AlertBackend,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: DEFAULT_SCAN_INTERVAL_MS,
            notified_policy: NotifiedPolicy::default(),
            backend: AlertBackend::default(),
        }
    }
}

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_MS
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub mode: DisplayMode,
}

fn config_path() -> Result<PathBuf> {
    Ok(get_app_dir()?.join("config.toml"))
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(load_config()?.unwrap_or_default())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.alerts.scan_interval_ms).max(MIN_SCAN_INTERVAL)
    }
}

pub fn load_config() -> Result<Option<Config>> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(Some(config))
}

pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path()?;
    let content = toml::to_string_pretty(config)?;
    fs::write(&path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.alerts.scan_interval_ms, 1000);
        assert_eq!(config.alerts.notified_policy, NotifiedPolicy::Attempted);
        assert_eq!(config.alerts.backend, AlertBackend::Desktop);
        assert_eq!(config.display.mode, DisplayMode::Light);
    }

    #[test]
    fn test_config_deserialize_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.alerts.scan_interval_ms, DEFAULT_SCAN_INTERVAL_MS);
        assert_eq!(config.scan_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_config_deserialize_partial_toml() {
        let toml = r#"
            [alerts]
            notified_policy = "delivered"

            [display]
            mode = "dark"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.alerts.notified_policy, NotifiedPolicy::Delivered);
        assert_eq!(config.display.mode, DisplayMode::Dark);
        // Other fields should have defaults
        assert_eq!(config.alerts.scan_interval_ms, DEFAULT_SCAN_INTERVAL_MS);
        assert_eq!(config.alerts.backend, AlertBackend::Desktop);
    }

    #[test]
    fn test_config_rejects_unknown_backend() {
        let toml = r#"
            [alerts]
            backend = "carrier-pigeon"
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let mut config = Config::default();
        config.alerts.scan_interval_ms = 0;
        assert_eq!(config.scan_interval(), MIN_SCAN_INTERVAL);
    }

    #[test]
    fn test_config_serialize_roundtrip() {
        let mut config = Config::default();
        config.alerts.backend = AlertBackend::Terminal;
        config.alerts.scan_interval_ms = 250;

        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.alerts.backend, AlertBackend::Terminal);
        assert_eq!(parsed.alerts.scan_interval_ms, 250);
    }
}
