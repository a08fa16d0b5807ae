mod icmp_probe;
mod local_address;
mod tcp_probe;

pub use icmp_probe::IcmpReachabilityProbe;
pub use local_address::{RoutedLocalAddress, StaticLocalAddress};
pub use tcp_probe::TcpReachabilityProbe;
