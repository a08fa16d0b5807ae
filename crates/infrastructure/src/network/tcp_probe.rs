use async_trait::async_trait;
use domain::DomainError;
use domain::network::ReachabilityProbe;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::trace;

/// Reachability by TCP handshake: the device is alive if it accepts a
/// connection on the given port. The connection is closed immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpReachabilityProbe;

impl TcpReachabilityProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReachabilityProbe for TcpReachabilityProbe {
    async fn probe(&self, address: &str, port: u16) -> Result<(), DomainError> {
        match TcpStream::connect((address, port)).await {
            Ok(mut stream) => {
                trace!(address, port, "Probe accepted");
                let _ = stream.shutdown().await;
                Ok(())
            }
            Err(e) => {
                trace!(address, port, error = %e, "Probe rejected");
                Err(DomainError::ProbeFailed(format!("{}:{}: {}", address, port, e)))
            }
        }
    }
}
