pub mod arbiter;
pub mod broadcast;
pub mod connection_manager;
pub mod liveness;
pub mod router;
pub mod spooler;

pub use arbiter::CompletionArbiter;
pub use broadcast::Broadcast;
pub use connection_manager::{ConnectionManager, ManagerSettings};
pub use liveness::LivenessProber;
pub use router::{RouterExit, SocketEventRouter};
pub use spooler::{PrintSpooler, SpoolerHandle};
