use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use domain::network::{LocalAddressResolver, ReachabilityProbe};
use domain::{DiscoveredEndpoint, SubnetPrefix};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, info, trace};

use crate::network::TcpReachabilityProbe;

/// Every host of a /24 is probed at once
const HOSTS_PER_SUBNET: usize = 256;

/// Scans a /24 network for devices accepting connections on a port
#[derive(Clone)]
pub struct SubnetScanner {
    probe: Arc<dyn ReachabilityProbe>,
}

impl SubnetScanner {
    pub fn new(probe: Arc<dyn ReachabilityProbe>) -> Self {
        Self { probe }
    }

    /// Scanner that probes with a plain TCP handshake
    pub fn tcp() -> Self {
        Self::new(Arc::new(TcpReachabilityProbe::new()))
    }

    /// Probe `prefix.0` through `prefix.255` on `port`.
    ///
    /// Nothing happens until the stream is polled. Endpoints are yielded in
    /// the order their probes succeed; hosts that refuse, fail or do not
    /// answer within `timeout` are skipped. The stream ends once every probe
    /// has resolved, so it never outlives `timeout` by much.
    pub fn discover(
        &self,
        prefix: SubnetPrefix,
        port: u16,
        timeout: Duration,
    ) -> BoxStream<'static, DiscoveredEndpoint> {
        info!(subnet = %prefix, port, timeout_ms = timeout.as_millis() as u64, "Scanning subnet");
        let probe = Arc::clone(&self.probe);

        stream::iter(prefix.hosts())
            .map(move |ip| probe_host(Arc::clone(&probe), ip, port, timeout))
            .buffer_unordered(HOSTS_PER_SUBNET)
            .filter_map(future::ready)
            .boxed()
    }

    /// Scan the /24 the local host lives in. Empty when no local address
    /// can be determined.
    pub async fn discover_local(
        &self,
        resolver: &dyn LocalAddressResolver,
        port: u16,
        timeout: Duration,
    ) -> BoxStream<'static, DiscoveredEndpoint> {
        match resolver.local_ipv4().await {
            Some(ip) => self.discover(SubnetPrefix::from_address(ip), port, timeout),
            None => {
                debug!("No local address, nothing to scan");
                stream::empty().boxed()
            }
        }
    }

    /// Run a whole scan and gather the results
    pub async fn scan(
        &self,
        prefix: SubnetPrefix,
        port: u16,
        timeout: Duration,
    ) -> Vec<DiscoveredEndpoint> {
        let found: Vec<_> = self.discover(prefix, port, timeout).collect().await;
        info!(subnet = %prefix, port, found = found.len(), "Subnet scan finished");
        found
    }
}

async fn probe_host(
    probe: Arc<dyn ReachabilityProbe>,
    ip: Ipv4Addr,
    port: u16,
    timeout: Duration,
) -> Option<DiscoveredEndpoint> {
    let address = ip.to_string();
    match tokio::time::timeout(timeout, probe.probe(&address, port)).await {
        Ok(Ok(())) => {
            debug!(address = %address, port, "Device found");
            Some(DiscoveredEndpoint::new(IpAddr::V4(ip), port))
        }
        Ok(Err(e)) => {
            trace!(address = %address, port, error = %e, "No device");
            None
        }
        Err(_) => None,
    }
}
