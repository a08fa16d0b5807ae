use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Single reachability check against one device.
///
/// Implementations do not bound their own duration; callers wrap the call
/// in a timeout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn probe(&self, address: &str, port: u16) -> Result<(), DomainError>;
}

/// Resolves the address this host uses on the local network
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocalAddressResolver: Send + Sync {
    /// `None` when no usable IPv4 address can be determined
    async fn local_ipv4(&self) -> Option<Ipv4Addr>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeResult {
    Reachable { latency: Duration },
    Unreachable { reason: String },
}

/// Outcome of one liveness cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub target: String,
    pub result: ProbeResult,
    pub timestamp: DateTime<Utc>,
}

impl ProbeOutcome {
    pub fn reachable(target: impl Into<String>, latency: Duration) -> Self {
        Self {
            target: target.into(),
            result: ProbeResult::Reachable { latency },
            timestamp: Utc::now(),
        }
    }

    pub fn unreachable(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            result: ProbeResult::Unreachable {
                reason: reason.into(),
            },
            timestamp: Utc::now(),
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self.result, ProbeResult::Reachable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_constructors() {
        let ok = ProbeOutcome::reachable("10.0.0.5:9100", Duration::from_millis(3));
        assert!(ok.is_reachable());

        let lost = ProbeOutcome::unreachable("10.0.0.5:9100", "timed out");
        assert!(!lost.is_reachable());
        assert_eq!(
            lost.result,
            ProbeResult::Unreachable {
                reason: "timed out".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_probe_is_object_safe() {
        let mut mock = MockReachabilityProbe::new();
        mock.expect_probe()
            .times(1)
            .returning(|address, port| {
                Err(DomainError::ProbeFailed(format!("{address}:{port} refused")))
            });

        let probe: Box<dyn ReachabilityProbe> = Box::new(mock);
        assert_eq!(
            probe.probe("10.0.0.5", 9100).await,
            Err(DomainError::ProbeFailed("10.0.0.5:9100 refused".to_string()))
        );
    }

    #[tokio::test]
    async fn test_resolver_may_have_no_address() {
        let mut mock = MockLocalAddressResolver::new();
        mock.expect_local_ipv4().returning(|| None);
        assert_eq!(mock.local_ipv4().await, None);
    }
}
