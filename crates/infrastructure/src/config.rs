use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use domain::printer::{ConnectionParameters, DEFAULT_PRINTER_PORT};
use domain::{DomainError, SubnetPrefix};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PrinterConfig {
    /// Printer host; unset until one is chosen (e.g. from a scan)
    pub address: Option<String>,
    #[serde(default = "default_printer_port")]
    pub port: u16,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_printer_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

fn default_printer_port() -> u16 {
    DEFAULT_PRINTER_PORT
}
fn default_connect_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LivenessConfig {
    /// TCP port for liveness handshakes; ICMP echo when unset
    pub port: Option<u16>,
    #[serde(default = "default_liveness_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_liveness_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            port: None,
            interval_ms: default_liveness_interval_ms(),
            timeout_ms: default_liveness_timeout_ms(),
        }
    }
}

fn default_liveness_interval_ms() -> u64 {
    3_000
}
fn default_liveness_timeout_ms() -> u64 {
    7_000
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DiscoveryConfig {
    /// `a.b.c` or a full address; when unset the local address is used
    pub subnet: Option<String>,
    #[serde(default = "default_printer_port")]
    pub port: u16,
    #[serde(default = "default_discovery_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            subnet: None,
            port: default_printer_port(),
            timeout_ms: default_discovery_timeout_ms(),
        }
    }
}

fn default_discovery_timeout_ms() -> u64 {
    4_000
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SpoolerConfig {
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
}

impl Default for SpoolerConfig {
    fn default() -> Self {
        Self {
            queue_depth: default_queue_depth(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
        }
    }
}

fn default_queue_depth() -> usize {
    32
}
fn default_reconnect_interval_ms() -> u64 {
    5_000
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DriverConfig {
    #[serde(default)]
    pub printer: PrinterConfig,
    #[serde(default)]
    pub liveness: LivenessConfig,
    #[serde(default = "default_completion_timeout_ms")]
    pub completion_timeout_ms: u64,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub spooler: SpoolerConfig,
}

fn default_completion_timeout_ms() -> u64 {
    10_000
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            printer: PrinterConfig::default(),
            liveness: LivenessConfig::default(),
            completion_timeout_ms: default_completion_timeout_ms(),
            discovery: DiscoveryConfig::default(),
            spooler: SpoolerConfig::default(),
        }
    }
}

impl DriverConfig {
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("completion_timeout_ms", 10_000i64)?
            // Shared settings, e.g. config/default.toml
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            // Per-mode overrides, e.g. config/production.toml
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Environment variables (e.g. PRINTER__PRINTER__ADDRESS=10.0.0.20)
            .add_source(
                Environment::with_prefix("PRINTER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    /// Connection parameters for the configured printer
    pub fn connection_parameters(&self) -> Result<ConnectionParameters, DomainError> {
        let address = self.printer.address.as_deref().ok_or_else(|| {
            DomainError::InvalidConfiguration("printer.address is not set".to_string())
        })?;

        Ok(ConnectionParameters::new(address)?
            .with_port(self.printer.port)
            .with_connect_timeout(Duration::from_millis(self.printer.connect_timeout_ms)))
    }

    /// Explicit scan prefix, if one is configured
    pub fn discovery_prefix(&self) -> Result<Option<SubnetPrefix>, DomainError> {
        self.discovery
            .subnet
            .as_deref()
            .map(SubnetPrefix::new)
            .transpose()
    }

    pub fn liveness_interval(&self) -> Duration {
        Duration::from_millis(self.liveness.interval_ms)
    }

    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_millis(self.liveness.timeout_ms)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_millis(self.completion_timeout_ms)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery.timeout_ms)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.spooler.reconnect_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_any_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = DriverConfig::load(dir.path().to_str().unwrap()).unwrap();

        assert_eq!(config.printer.port, 9100);
        assert_eq!(config.printer.connect_timeout_ms, 5_000);
        assert_eq!(config.liveness_interval(), Duration::from_secs(3));
        assert_eq!(config.liveness_timeout(), Duration::from_secs(7));
        assert_eq!(config.completion_timeout(), Duration::from_secs(10));
        assert_eq!(config.discovery.port, 9100);
        assert_eq!(config.discovery_timeout(), Duration::from_secs(4));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            r#"
completion_timeout_ms = 2500

[printer]
address = "192.168.1.50"
port = 9101

[discovery]
subnet = "192.168.1"
"#,
        )
        .unwrap();

        let config = DriverConfig::load(dir.path().to_str().unwrap()).unwrap();
        let params = config.connection_parameters().unwrap();
        assert_eq!(params.address, "192.168.1.50");
        assert_eq!(params.port, 9101);
        assert_eq!(params.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.completion_timeout(), Duration::from_millis(2500));
        assert_eq!(
            config.discovery_prefix().unwrap(),
            Some(SubnetPrefix::new("192.168.1").unwrap())
        );
    }

    #[test]
    fn test_missing_address_is_a_configuration_error() {
        let config = DriverConfig::default();
        assert!(matches!(
            config.connection_parameters(),
            Err(DomainError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_invalid_subnet_is_reported() {
        let mut config = DriverConfig::default();
        config.discovery.subnet = Some("192.168".to_string());
        assert!(config.discovery_prefix().is_err());
    }
}
