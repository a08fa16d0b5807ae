mod endpoint;
mod probe;
mod subnet;

pub use endpoint::DiscoveredEndpoint;
pub use probe::{LocalAddressResolver, ProbeOutcome, ProbeResult, ReachabilityProbe};
pub use subnet::SubnetPrefix;
