use std::sync::Arc;
use std::time::Duration;

use domain::ProbeOutcome;
use domain::network::ReachabilityProbe;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Periodic reachability check against one device.
///
/// One outcome is emitted per cycle. There is no retry policy beyond the
/// interval itself. Once the token is cancelled nothing further is emitted.
pub struct LivenessProber {
    probe: Arc<dyn ReachabilityProbe>,
    address: String,
    port: u16,
    interval: Duration,
    timeout: Duration,
}

impl LivenessProber {
    pub fn new(
        probe: Arc<dyn ReachabilityProbe>,
        address: impl Into<String>,
        port: u16,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            probe,
            address: address.into(),
            port,
            interval,
            timeout,
        }
    }

    pub fn spawn(
        self,
        cancel: CancellationToken,
        outcomes: mpsc::Sender<ProbeOutcome>,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel, outcomes))
    }

    pub async fn run(self, cancel: CancellationToken, outcomes: mpsc::Sender<ProbeOutcome>) {
        let target = format!("{}:{}", self.address, self.port);
        debug!(endpoint = %target, interval_ms = self.interval.as_millis() as u64, "Liveness prober started");

        let mut ticker = tokio::time::interval(self.interval);
        // A slow probe pushes the schedule back instead of bursting
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick is immediate; the first probe goes out one interval in
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let started = Instant::now();
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = tokio::time::timeout(self.timeout, self.probe.probe(&self.address, self.port)) => result,
            };

            let outcome = match result {
                Ok(Ok(())) => ProbeOutcome::reachable(&target, started.elapsed()),
                Ok(Err(e)) => ProbeOutcome::unreachable(&target, e.to_string()),
                Err(_) => ProbeOutcome::unreachable(
                    &target,
                    format!("no answer within {}ms", self.timeout.as_millis()),
                ),
            };
            trace!(endpoint = %target, reachable = outcome.is_reachable(), "Probe cycle");

            if cancel.is_cancelled() || outcomes.send(outcome).await.is_err() {
                break;
            }
        }

        debug!(endpoint = %target, "Liveness prober stopped");
    }
}
