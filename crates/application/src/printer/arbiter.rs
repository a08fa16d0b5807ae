use std::time::Duration;

use domain::printer::STATUS_QUERY;
use domain::{DomainError, PrinterState};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use super::broadcast::Broadcast;

/// Decides whether a print job completed.
///
/// The device has no job acknowledgement, so after the payload a status
/// query is sent and the printer-state channel is raced against a timeout.
#[derive(Debug, Clone, Copy)]
pub struct CompletionArbiter {
    timeout: Duration,
}

impl CompletionArbiter {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Write the payload, announce `Printing`, then send the status query.
    ///
    /// The returned receiver was subscribed before the first byte went out,
    /// so a fast reply cannot be missed.
    pub async fn write_job<W>(
        &self,
        writer: &mut W,
        payload: &[u8],
        printer_state: &Broadcast<PrinterState>,
    ) -> Result<broadcast::Receiver<PrinterState>, DomainError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let states = printer_state.subscribe();

        writer
            .write_all(payload)
            .await
            .map_err(|e| DomainError::WriteFailed(format!("payload: {}", e)))?;
        printer_state.publish(PrinterState::Printing);

        writer
            .write_all(&STATUS_QUERY)
            .await
            .map_err(|e| DomainError::WriteFailed(format!("status query: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| DomainError::WriteFailed(format!("flush: {}", e)))?;

        debug!(bytes = payload.len(), "Job written, status query sent");
        Ok(states)
    }

    /// First terminal printer state wins; otherwise false after the timeout.
    /// Whichever side loses is dropped with the race.
    pub async fn await_verdict(&self, mut states: broadcast::Receiver<PrinterState>) -> bool {
        match tokio::time::timeout(self.timeout, next_verdict(&mut states)).await {
            Ok(verdict) => verdict,
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "No completion signal from printer"
                );
                false
            }
        }
    }
}

async fn next_verdict(states: &mut broadcast::Receiver<PrinterState>) -> bool {
    loop {
        match states.recv().await {
            Ok(state) => {
                if let Some(verdict) = state.completion_verdict() {
                    debug!(%state, verdict, "Completion resolved");
                    return verdict;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Printer state subscriber lagged");
            }
            Err(RecvError::Closed) => return false,
        }
    }
}
