use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// Value object for the first three octets of a /24 network
///
/// Rules:
/// - Accepts `a.b.c` or a full address `a.b.c.d` (the last octet is dropped)
/// - Every octet must be a decimal number in 0..=255
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubnetPrefix([u8; 3]);

impl SubnetPrefix {
    /// Parse a prefix or an explicit address
    pub fn new(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(DomainError::InvalidSubnetPrefix(
                "Subnet prefix cannot be empty".to_string(),
            ));
        }

        let parts: Vec<&str> = input.split('.').collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(DomainError::InvalidSubnetPrefix(format!(
                "{input} must have three or four dotted-decimal octets"
            )));
        }

        let mut octets = [0u8; 4];
        for (slot, part) in octets.iter_mut().zip(&parts) {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(DomainError::InvalidSubnetPrefix(format!(
                    "{input}: octet {part:?} is not a decimal number"
                )));
            }
            *slot = part.parse().map_err(|_| {
                DomainError::InvalidSubnetPrefix(format!("{input}: octet {part} is out of range"))
            })?;
        }

        Ok(Self([octets[0], octets[1], octets[2]]))
    }

    /// Prefix of the /24 network `address` lives in
    pub fn from_address(address: Ipv4Addr) -> Self {
        let [a, b, c, _] = address.octets();
        Self([a, b, c])
    }

    pub fn octets(&self) -> [u8; 3] {
        self.0
    }

    /// Address of `host` inside this network
    pub fn host(&self, host: u8) -> Ipv4Addr {
        let [a, b, c] = self.0;
        Ipv4Addr::new(a, b, c, host)
    }

    /// All 256 addresses `.0` through `.255`, in numeric order
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let prefix = *self;
        (0..=u8::MAX).map(move |host| prefix.host(host))
    }
}

impl FromStr for SubnetPrefix {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl std::fmt::Display for SubnetPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a}.{b}.{c}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_octet_prefix() {
        let prefix = SubnetPrefix::new("192.168.1").unwrap();
        assert_eq!(prefix.octets(), [192, 168, 1]);
        assert_eq!(prefix.to_string(), "192.168.1");
    }

    #[test]
    fn test_full_address_drops_host() {
        let prefix: SubnetPrefix = "10.0.7.42".parse().unwrap();
        assert_eq!(prefix.to_string(), "10.0.7");
    }

    #[test]
    fn test_from_address() {
        let prefix = SubnetPrefix::from_address(Ipv4Addr::new(172, 16, 4, 9));
        assert_eq!(prefix.host(50), Ipv4Addr::new(172, 16, 4, 50));
    }

    #[test]
    fn test_hosts_cover_whole_range() {
        let prefix = SubnetPrefix::new("192.168.1").unwrap();
        let hosts: Vec<_> = prefix.hosts().collect();
        assert_eq!(hosts.len(), 256);
        assert_eq!(hosts[0], Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(hosts[255], Ipv4Addr::new(192, 168, 1, 255));
    }

    #[test]
    fn test_invalid_prefixes() {
        for input in ["", "192.168", "192.168.1.2.3", "192.168.x", "192.168.256", "1..2", "-1.0.0"] {
            assert!(SubnetPrefix::new(input).is_err(), "{input:?} should be rejected");
        }
    }
}
