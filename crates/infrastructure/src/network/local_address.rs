use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use async_trait::async_trait;
use domain::network::LocalAddressResolver;
use tracing::debug;

/// Address used to pick the outbound route. Nothing is sent to it.
const ROUTE_PROBE_TARGET: (Ipv4Addr, u16) = (Ipv4Addr::new(192, 0, 2, 1), 9);

/// Finds the source address the OS routing table selects for outbound
/// traffic, by connecting an unbound UDP socket.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutedLocalAddress;

impl RoutedLocalAddress {
    pub fn new() -> Self {
        Self
    }

    fn resolve() -> std::io::Result<Option<Ipv4Addr>> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(ROUTE_PROBE_TARGET)?;
        match socket.local_addr()?.ip() {
            IpAddr::V4(ip) if !ip.is_unspecified() && !ip.is_loopback() => Ok(Some(ip)),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl LocalAddressResolver for RoutedLocalAddress {
    async fn local_ipv4(&self) -> Option<Ipv4Addr> {
        // connect() on UDP only consults the routing table, but it is still
        // a blocking syscall
        match tokio::task::spawn_blocking(Self::resolve).await {
            Ok(Ok(ip)) => ip,
            Ok(Err(e)) => {
                debug!(error = %e, "No routable local address");
                None
            }
            Err(e) => {
                debug!(error = %e, "Local address lookup task failed");
                None
            }
        }
    }
}

/// Fixed address, for hosts that already know it (or for tests)
#[derive(Debug, Clone, Copy)]
pub struct StaticLocalAddress(pub Option<Ipv4Addr>);

#[async_trait]
impl LocalAddressResolver for StaticLocalAddress {
    async fn local_ipv4(&self) -> Option<Ipv4Addr> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_address() {
        let ip = Ipv4Addr::new(10, 1, 2, 3);
        assert_eq!(StaticLocalAddress(Some(ip)).local_ipv4().await, Some(ip));
        assert_eq!(StaticLocalAddress(None).local_ipv4().await, None);
    }

    #[tokio::test]
    async fn test_routed_address_is_never_loopback() {
        // Result depends on the host network; only the filtering is checked
        if let Some(ip) = RoutedLocalAddress::new().local_ipv4().await {
            assert!(!ip.is_loopback());
            assert!(!ip.is_unspecified());
        }
    }
}
