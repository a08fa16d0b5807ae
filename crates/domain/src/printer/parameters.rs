use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// Default raw printing port (JetDirect)
pub const DEFAULT_PRINTER_PORT: u16 = 9100;

/// Default time allowed for the TCP handshake
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Input to a connect call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParameters {
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(
        default = "default_connect_timeout",
        rename = "connect_timeout_ms",
        with = "duration_ms"
    )]
    pub connect_timeout: Duration,
}

fn default_port() -> u16 {
    DEFAULT_PRINTER_PORT
}
fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

impl ConnectionParameters {
    /// Parameters for `address` on the default port and timeout
    pub fn new(address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidAddress(
                "Address cannot be empty".to_string(),
            ));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidAddress(format!(
                "Address {trimmed:?} must not contain whitespace"
            )));
        }

        Ok(Self {
            address: trimmed.to_string(),
            port: DEFAULT_PRINTER_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// `host:port` form used for logging
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ConnectionParameters::new("192.168.1.50").unwrap();
        assert_eq!(params.address, "192.168.1.50");
        assert_eq!(params.port, 9100);
        assert_eq!(params.connect_timeout, Duration::from_secs(5));
        assert_eq!(params.endpoint(), "192.168.1.50:9100");
    }

    #[test]
    fn test_builder_overrides() {
        let params = ConnectionParameters::new("printer.local")
            .unwrap()
            .with_port(9101)
            .with_connect_timeout(Duration::from_millis(250));
        assert_eq!(params.port, 9101);
        assert_eq!(params.connect_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_empty_address_rejected() {
        assert_eq!(
            ConnectionParameters::new("  ").unwrap_err(),
            DomainError::InvalidAddress("Address cannot be empty".to_string())
        );
        assert!(ConnectionParameters::new("10.0.0 .1").is_err());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let params: ConnectionParameters =
            serde_json::from_str(r#"{"address":"10.0.0.7"}"#).unwrap();
        assert_eq!(params.port, 9100);
        assert_eq!(params.connect_timeout, Duration::from_secs(5));

        let params: ConnectionParameters =
            serde_json::from_str(r#"{"address":"10.0.0.7","port":9200,"connect_timeout_ms":1500}"#)
                .unwrap();
        assert_eq!(params.port, 9200);
        assert_eq!(params.connect_timeout, Duration::from_millis(1500));
    }
}
