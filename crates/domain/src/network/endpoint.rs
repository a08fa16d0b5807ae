use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// A device that accepted a connection during a scan
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscoveredEndpoint {
    /// `<ip>:<port>`
    pub display_name: String,
    pub address: String,
    pub port: u16,
}

impl DiscoveredEndpoint {
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self {
            display_name: format!("{}:{}", address, port),
            address: address.to_string(),
            port,
        }
    }
}

impl std::fmt::Display for DiscoveredEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_display_name_is_ip_and_port() {
        let endpoint = DiscoveredEndpoint::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50)), 9100);
        assert_eq!(endpoint.display_name, "192.168.1.50:9100");
        assert_eq!(endpoint.address, "192.168.1.50");
        assert_eq!(endpoint.port, 9100);
    }
}
