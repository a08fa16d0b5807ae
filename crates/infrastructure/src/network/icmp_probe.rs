use std::net::IpAddr;

use async_trait::async_trait;
use domain::DomainError;
use domain::network::ReachabilityProbe;
use tracing::trace;

/// Standard echo payload size
const ECHO_PAYLOAD: [u8; 56] = [0; 56];

/// Reachability by ICMP echo request. The port is ignored, so probing never
/// touches the printer's data port.
#[derive(Debug, Clone, Copy, Default)]
pub struct IcmpReachabilityProbe;

impl IcmpReachabilityProbe {
    pub fn new() -> Self {
        Self
    }
}

async fn resolve(address: &str) -> Result<IpAddr, DomainError> {
    if let Ok(ip) = address.parse::<IpAddr>() {
        return Ok(ip);
    }

    tokio::net::lookup_host((address, 0))
        .await
        .map_err(|e| DomainError::ProbeFailed(format!("{}: {}", address, e)))?
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| DomainError::ProbeFailed(format!("{}: no address", address)))
}

#[async_trait]
impl ReachabilityProbe for IcmpReachabilityProbe {
    async fn probe(&self, address: &str, _port: u16) -> Result<(), DomainError> {
        let ip = resolve(address).await?;

        match surge_ping::ping(ip, &ECHO_PAYLOAD).await {
            Ok((_packet, rtt)) => {
                trace!(address, rtt_ms = rtt.as_millis() as u64, "Echo reply");
                Ok(())
            }
            Err(e) => {
                trace!(address, error = %e, "No echo reply");
                Err(DomainError::ProbeFailed(format!("{}: {}", address, e)))
            }
        }
    }
}
