//! Infrastructure layer - Network adapters, configuration and logging setup

pub mod config;
pub mod discovery;
pub mod network;
pub mod telemetry;

pub use config::DriverConfig;
pub use discovery::SubnetScanner;
pub use network::{
    IcmpReachabilityProbe, RoutedLocalAddress, StaticLocalAddress, TcpReachabilityProbe,
};
