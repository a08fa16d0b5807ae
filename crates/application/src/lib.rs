//! Application layer - Printer link supervision and print workflows

pub mod printer;

pub use printer::{ConnectionManager, ManagerSettings, PrintSpooler, SpoolerHandle};
