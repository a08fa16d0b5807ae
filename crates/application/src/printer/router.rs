use domain::PrinterState;
use domain::printer::classify_status;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::broadcast::Broadcast;

const READ_BUFFER_SIZE: usize = 256;

/// Why a router stopped reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterExit {
    /// Remote end closed the stream
    Closed,
    /// Read failed
    Failed(String),
    /// Stopped from outside; the socket is being torn down elsewhere
    Cancelled,
}

/// Sole reader of a printer socket's inbound half.
///
/// Every inbound message is classified by its status byte and published as
/// a printer state. Stream closure publishes `Stopped`, a read error
/// publishes `Error`. Bound to one socket; a new socket gets a new router.
pub struct SocketEventRouter<R> {
    reader: R,
    printer_state: Broadcast<PrinterState>,
    peer: String,
}

impl<R> SocketEventRouter<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R, printer_state: Broadcast<PrinterState>, peer: impl Into<String>) -> Self {
        Self {
            reader,
            printer_state,
            peer: peer.into(),
        }
    }

    pub async fn run(mut self, cancel: CancellationToken) -> RouterExit {
        let mut buffer = [0u8; READ_BUFFER_SIZE];

        loop {
            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => return RouterExit::Cancelled,
                read = self.reader.read(&mut buffer) => read,
            };

            match read {
                Ok(0) => {
                    info!(peer = %self.peer, "Printer closed the connection");
                    self.printer_state.publish(PrinterState::Stopped);
                    return RouterExit::Closed;
                }
                Ok(n) => {
                    if let Some(state) = classify_status(&buffer[..n]) {
                        debug!(peer = %self.peer, status = buffer[0], %state, "Status byte");
                        self.printer_state.publish(state);
                    }
                }
                Err(e) => {
                    warn!(peer = %self.peer, error = %e, "Printer socket error");
                    self.printer_state.publish(PrinterState::Error);
                    return RouterExit::Failed(e.to_string());
                }
            }
        }
    }
}
