use std::sync::Arc;

use domain::ConnectionParameters;
use infrastructure::DriverConfig;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, sleep};
use tracing::{debug, error, info, warn};

use super::connection_manager::ConnectionManager;

struct PrintJob {
    payload: Vec<u8>,
    reply: oneshot::Sender<bool>,
}

/// Sends jobs to a [`PrintSpooler`]
#[derive(Clone)]
pub struct SpoolerHandle {
    job_tx: mpsc::Sender<PrintJob>,
}

impl SpoolerHandle {
    /// Queue `payload` and wait for its completion verdict.
    ///
    /// False if the spooler has shut down.
    pub async fn print(&self, payload: Vec<u8>) -> bool {
        let (reply, verdict) = oneshot::channel();
        if self.job_tx.send(PrintJob { payload, reply }).await.is_err() {
            warn!("Print spooler is gone, job dropped");
            return false;
        }
        verdict.await.unwrap_or(false)
    }
}

/// Feeds queued jobs to one printer, connecting on demand
pub struct PrintSpooler {
    manager: Arc<ConnectionManager>,
    params: ConnectionParameters,
    job_rx: mpsc::Receiver<PrintJob>,
    reconnect_interval: Duration,
}

impl PrintSpooler {
    pub fn new(
        manager: Arc<ConnectionManager>,
        params: ConnectionParameters,
        queue_depth: usize,
    ) -> (Self, SpoolerHandle) {
        let (job_tx, job_rx) = mpsc::channel(queue_depth.max(1));
        (
            Self {
                manager,
                params,
                job_rx,
                reconnect_interval: Duration::from_secs(5),
            },
            SpoolerHandle { job_tx },
        )
    }

    pub fn from_config(
        manager: Arc<ConnectionManager>,
        config: &DriverConfig,
    ) -> Result<(Self, SpoolerHandle), domain::DomainError> {
        let params = config.connection_parameters()?;
        let (spooler, handle) = Self::new(manager, params, config.spooler.queue_depth);
        Ok((spooler.with_reconnect_interval(config.reconnect_interval()), handle))
    }

    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    pub async fn run(mut self) {
        info!(endpoint = %self.params.endpoint(), "🖨️ Print spooler started");

        while let Some(job) = self.job_rx.recv().await {
            let verdict = if self.ensure_connected().await {
                self.manager.send(&job.payload).await
            } else {
                error!(bytes = job.payload.len(), "❌ Printer unreachable, job dropped");
                false
            };

            if job.reply.send(verdict).is_err() {
                debug!("Caller stopped waiting for the verdict");
            }
        }

        // All handles dropped
        info!("🖨️ Print job channel closed. Spooler shutting down.");
    }

    /// One attempt, then one retry after the reconnect interval
    async fn ensure_connected(&self) -> bool {
        if self.manager.status().await.is_connected() {
            return true;
        }

        warn!(endpoint = %self.params.endpoint(), "🔌 Connecting to printer...");
        if self.manager.connect(&self.params).await {
            return true;
        }

        warn!(retry_in = ?self.reconnect_interval, "Connection failed, retrying once");
        sleep(self.reconnect_interval).await;
        self.manager.connect(&self.params).await
    }
}
