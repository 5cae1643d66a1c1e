//! Configuration types for trade-warden

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Execution gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    /// Gateway to use; only "paper" ships with the engine
    #[serde(default = "default_broker_name")]
    pub name: String,

    /// Base URL of the market data REST API
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Starting balance for the paper gateway
    #[serde(default = "default_paper_balance")]
    pub paper_balance: Decimal,

    /// Simulated fee rate for the paper gateway
    #[serde(default = "default_fee_rate")]
    pub fee_rate: Decimal,
}

/// Risk defaults applied when a request does not specify its own
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    /// Percentage of balance risked per trade
    #[serde(default = "default_risk_percent")]
    pub default_risk_percent: Decimal,

    /// Hard cap on computed position size
    #[serde(default)]
    pub max_position_size: Option<Decimal>,
}

/// Monitoring loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between polling ticks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Consecutive price failures per symbol before the feed is reported
    /// degraded
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
}

/// Journal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path of the JSON-lines journal file
    #[serde(default = "default_journal_path")]
    pub path: PathBuf,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_broker_name() -> String {
    "paper".to_string()
}
fn default_feed_url() -> String {
    "https://api.binance.com".to_string()
}
fn default_paper_balance() -> Decimal {
    Decimal::new(10000, 0)
}
fn default_fee_rate() -> Decimal {
    Decimal::ZERO
}
fn default_risk_percent() -> Decimal {
    Decimal::ONE
}
fn default_interval_secs() -> u64 {
    5
}
fn default_failure_threshold() -> u32 {
    5
}
fn default_true() -> bool {
    true
}
fn default_journal_path() -> PathBuf {
    PathBuf::from("./trades.jsonl")
}
fn default_metrics_port() -> u16 {
    9090
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            name: default_broker_name(),
            feed_url: default_feed_url(),
            paper_balance: default_paper_balance(),
            fee_rate: default_fee_rate(),
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            default_risk_percent: default_risk_percent(),
            max_position_size: None,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            failure_threshold: default_failure_threshold(),
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_journal_path(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: default_metrics_port(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [broker]
            name = "paper"
            feed_url = "https://api.binance.com"
            paper_balance = 25000
            fee_rate = 0.001

            [risk]
            default_risk_percent = 2.0
            max_position_size = 5.0

            [monitor]
            interval_secs = 10
            failure_threshold = 3

            [journal]
            enabled = false
            path = "/tmp/trades.jsonl"

            [telemetry]
            metrics_port = 9100
            log_level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.broker.paper_balance, dec!(25000));
        assert_eq!(config.risk.default_risk_percent, dec!(2));
        assert_eq!(config.risk.max_position_size, Some(dec!(5)));
        assert_eq!(config.monitor.interval_secs, 10);
        assert!(!config.journal.enabled);
        assert_eq!(config.telemetry.metrics_port, 9100);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.broker.name, "paper");
        assert_eq!(config.risk.default_risk_percent, dec!(1));
        assert_eq!(config.risk.max_position_size, None);
        assert_eq!(config.monitor.interval_secs, 5);
        assert_eq!(config.monitor.failure_threshold, 5);
        assert!(config.journal.enabled);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn test_partial_section_uses_field_defaults() {
        let toml = r#"
            [monitor]
            interval_secs = 1
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.monitor.interval_secs, 1);
        assert_eq!(config.monitor.failure_threshold, 5);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }
}
