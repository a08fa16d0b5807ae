//! Domain layer - Printer link types and ports, no I/O
//!
//! This crate contains:
//! - Value Objects (ConnectionParameters, SubnetPrefix, DiscoveredEndpoint)
//! - Link and printer states (ConnectionStatus, PrinterState)
//! - The status byte convention (STATUS_QUERY, BUSY_BIT)
//! - Port interfaces (ReachabilityProbe, LocalAddressResolver)
//!
//! Principles:
//! - No dependencies on infrastructure
//! - No sockets, no runtime
//! - Testable in isolation

pub mod error;
pub mod network;
pub mod printer;

// Re-export commonly used types
pub use error::DomainError;
pub use network::{DiscoveredEndpoint, ProbeOutcome, SubnetPrefix};
pub use printer::{ConnectionParameters, ConnectionStatus, PrinterState};
