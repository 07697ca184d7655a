//! Relay configuration
//!
//! Read from a config file (any format the `config` crate understands,
//! e.g. `config.json`) with `ALERT_RELAY_*` environment overrides:
//! `ALERT_RELAY_TELEGRAM__TOKEN` sets `telegram.token`.

use alert_delivery::DeliveryConfig;
use config::{Config, Environment, File};
use monitoring_api::ApiConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use telegram_notifier::TelegramConfig;
use thiserror::Error;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "ALERT_RELAY_CONFIG";

/// Config file looked up when `ALERT_RELAY_CONFIG` is unset (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config";

const ENV_PREFIX: &str = "ALERT_RELAY";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Invalid alert delivery configuration: {0}")]
    Invalid(#[from] alert_delivery::ConfigError),
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Prometheus exporter settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Exporter is disabled when unset
    pub listen_addr: Option<SocketAddr>,
}

/// Full relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub alerts: DeliveryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl AppConfig {
    /// Load from `path` layered under `ALERT_RELAY_*` environment variables
    pub fn load(path: &str) -> Result<Self, LoadError> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .add_source(environment())
            .build()?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: Config) -> Result<Self, LoadError> {
        let config: AppConfig = settings.try_deserialize()?;
        config.alerts.validate()?;
        Ok(config)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_delivery::AckPolicy;
    use config::FileFormat;
    use std::collections::HashMap;

    const MINIMAL: &str = r#"{
        "api": {"base_url": "http://monitoring:8000/api", "token": "api-token"},
        "telegram": {"token": "123:abc"}
    }"#;

    fn parse(json: &str, env: &[(&str, &str)]) -> Result<AppConfig, LoadError> {
        let vars: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let settings = Config::builder()
            .add_source(File::from_str(json, FileFormat::Json))
            .add_source(environment().source(Some(vars)))
            .build()?;
        AppConfig::from_settings(settings)
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse(MINIMAL, &[]).unwrap();

        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.telegram.api_url, "https://api.telegram.org");
        assert_eq!(config.alerts, DeliveryConfig::default());
        assert_eq!(config.logging.level, "info");
        assert!(config.metrics.listen_addr.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"{
                "api": {"base_url": "http://monitoring:8000/api", "token": "t", "delivery_window_secs": 3600},
                "telegram": {"token": "123:abc", "timeout_ms": 5000},
                "alerts": {
                    "alerts_per_second": 2.0,
                    "no_alerts_interval_ms": 1000,
                    "error_retry_interval_ms": 500,
                    "ack_policy": {"mode": "retry", "attempts": 3, "backoff_ms": 250}
                },
                "logging": {"level": "debug", "json": true},
                "metrics": {"listen_addr": "0.0.0.0:9100"}
            }"#,
            &[],
        )
        .unwrap();

        assert_eq!(config.api.delivery_window_secs, Some(3600));
        assert_eq!(config.telegram.timeout_ms, 5000);
        assert_eq!(config.alerts.alerts_per_second, 2.0);
        assert_eq!(
            config.alerts.ack_policy,
            AckPolicy::Retry { attempts: 3, backoff_ms: 250 }
        );
        assert!(config.logging.json);
        assert_eq!(config.metrics.listen_addr, Some("0.0.0.0:9100".parse().unwrap()));
    }

    #[test]
    fn test_environment_overrides_file() {
        let config = parse(
            MINIMAL,
            &[
                ("ALERT_RELAY_TELEGRAM__TOKEN", "999:override"),
                ("ALERT_RELAY_ALERTS__ALERTS_PER_SECOND", "4"),
            ],
        )
        .unwrap();

        assert_eq!(config.telegram.token, "999:override");
        assert_eq!(config.alerts.alerts_per_second, 4.0);
    }

    #[test]
    fn test_missing_section_is_an_error() {
        let result = parse(r#"{"api": {"base_url": "http://x", "token": "t"}}"#, &[]);
        assert!(matches!(result, Err(LoadError::Source(_))));
    }

    #[test]
    fn test_invalid_rate_is_rejected() {
        let result = parse(
            r#"{
                "api": {"base_url": "http://x", "token": "t"},
                "telegram": {"token": "1:a"},
                "alerts": {"alerts_per_second": 0}
            }"#,
            &[],
        );
        assert!(matches!(result, Err(LoadError::Invalid(_))));
    }
}
