use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use domain::network::{ProbeResult, ReachabilityProbe};
use domain::{ConnectionParameters, ConnectionStatus, DomainError, PrinterState, ProbeOutcome};
use infrastructure::{DriverConfig, IcmpReachabilityProbe, TcpReachabilityProbe};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::arbiter::CompletionArbiter;
use super::broadcast::Broadcast;
use super::liveness::LivenessProber;
use super::router::{RouterExit, SocketEventRouter};

const LIVENESS_BUFFER: usize = 8;

/// Timing knobs for a [`ConnectionManager`]
#[derive(Debug, Clone)]
pub struct ManagerSettings {
    pub liveness_interval: Duration,
    pub liveness_timeout: Duration,
    /// TCP port for liveness handshakes; ICMP echo when unset
    pub liveness_port: Option<u16>,
    pub completion_timeout: Duration,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            liveness_interval: Duration::from_secs(3),
            liveness_timeout: Duration::from_secs(7),
            liveness_port: None,
            completion_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&DriverConfig> for ManagerSettings {
    fn from(config: &DriverConfig) -> Self {
        Self {
            liveness_interval: config.liveness_interval(),
            liveness_timeout: config.liveness_timeout(),
            liveness_port: config.liveness.port,
            completion_timeout: config.completion_timeout(),
        }
    }
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TeardownReason {
    Disconnect,
    RemoteClosed,
    SocketError(String),
    LivenessLost(String),
    WriteFailed(String),
}

impl std::fmt::Display for TeardownReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnect => write!(f, "disconnect requested"),
            Self::RemoteClosed => write!(f, "closed by printer"),
            Self::SocketError(e) => write!(f, "socket error: {}", e),
            Self::LivenessLost(e) => write!(f, "liveness lost: {}", e),
            Self::WriteFailed(e) => write!(f, "write failed: {}", e),
        }
    }
}

/// One live socket with its router and prober
struct Session {
    id: u64,
    endpoint: String,
    writer: Arc<Mutex<OwnedWriteHalf>>,
    /// Stops the router and the prober
    cancel: CancellationToken,
}

struct Link {
    status: ConnectionStatus,
    session: Option<Session>,
}

struct Inner {
    settings: ManagerSettings,
    probe: Arc<dyn ReachabilityProbe>,
    status_channel: Broadcast<ConnectionStatus>,
    printer_state: Broadcast<PrinterState>,
    liveness: Broadcast<ProbeOutcome>,
    link: Mutex<Link>,
    /// Serializes connect attempts; the link lock is released during the handshake
    connect_gate: Mutex<()>,
    /// Held for the whole of a send so jobs resolve one at a time, FIFO
    send_queue: Mutex<()>,
    next_session: AtomicU64,
    /// Parent of every session token; cancelled when the manager is dropped
    shutdown: CancellationToken,
}

/// Owns the raw stream connection to one printer.
///
/// States are `None` and `Connected`. Every status change is published on
/// the status channel; printer activity goes out on the printer-state
/// channel. Neither channel replays, so subscribe before acting.
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl ConnectionManager {
    pub fn new(settings: ManagerSettings, probe: Arc<dyn ReachabilityProbe>) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                probe,
                status_channel: Broadcast::new("connection_status"),
                printer_state: Broadcast::new("printer_state"),
                liveness: Broadcast::new("liveness"),
                link: Mutex::new(Link {
                    status: ConnectionStatus::None,
                    session: None,
                }),
                connect_gate: Mutex::new(()),
                send_queue: Mutex::new(()),
                next_session: AtomicU64::new(1),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Manager with the network liveness check for `settings`: ICMP echo,
    /// or a TCP handshake when a separate liveness port is configured.
    /// The printer's data port is never probed.
    pub fn with_network_probe(settings: ManagerSettings) -> Self {
        let probe: Arc<dyn ReachabilityProbe> = match settings.liveness_port {
            Some(_) => Arc::new(TcpReachabilityProbe::new()),
            None => Arc::new(IcmpReachabilityProbe::new()),
        };
        Self::new(settings, probe)
    }

    pub fn from_config(config: &DriverConfig) -> Self {
        Self::with_network_probe(ManagerSettings::from(config))
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.inner.link.lock().await.status
    }

    pub fn subscribe_status(&self) -> broadcast::Receiver<ConnectionStatus> {
        self.inner.status_channel.subscribe()
    }

    pub fn subscribe_printer_state(&self) -> broadcast::Receiver<PrinterState> {
        self.inner.printer_state.subscribe()
    }

    pub fn subscribe_liveness(&self) -> broadcast::Receiver<ProbeOutcome> {
        self.inner.liveness.subscribe()
    }

    pub fn printer_state_channel(&self) -> &Broadcast<PrinterState> {
        &self.inner.printer_state
    }

    /// Open the socket and start the router and liveness prober.
    ///
    /// Already connected: returns true without touching anything. Failure
    /// leaves the status at `None` (published) and returns false.
    pub async fn connect(&self, params: &ConnectionParameters) -> bool {
        let _gate = self.inner.connect_gate.lock().await;
        if !self.inner.link.lock().await.status.can_connect() {
            debug!(endpoint = %params.endpoint(), "Already connected");
            return true;
        }

        let endpoint = params.endpoint();
        info!(endpoint = %endpoint, timeout_ms = params.connect_timeout.as_millis() as u64, "Connecting to printer");

        // Dropping the connect future or the stream destroys any partial socket
        let stream = match tokio::time::timeout(
            params.connect_timeout,
            TcpStream::connect((params.address.as_str(), params.port)),
        )
        .await
        {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(DomainError::ConnectionFailed(format!("{}: {}", endpoint, e))),
            Err(_) => Err(DomainError::ConnectionFailed(format!(
                "{}: no answer within {}ms",
                endpoint,
                params.connect_timeout.as_millis()
            ))),
        };

        let mut link = self.inner.link.lock().await;
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Printer connection failed");
                link.status = link.status.to_none();
                self.inner.status_channel.publish(link.status);
                return false;
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            debug!(endpoint = %endpoint, error = %e, "Could not disable Nagle");
        }
        let (reader, writer) = stream.into_split();

        let id = self.inner.next_session.fetch_add(1, Ordering::Relaxed);
        let cancel = self.inner.shutdown.child_token();

        if let Ok(next) = link.status.to_connected() {
            link.status = next;
        }
        link.session = Some(Session {
            id,
            endpoint: endpoint.clone(),
            writer: Arc::new(Mutex::new(writer)),
            cancel: cancel.clone(),
        });
        self.inner.status_channel.publish(link.status);
        info!(endpoint = %endpoint, session = id, "Printer connected");

        let router = SocketEventRouter::new(reader, self.inner.printer_state.clone(), endpoint);
        self.spawn_router(id, router, cancel.clone());
        self.spawn_liveness(id, params, cancel);

        true
    }

    /// Destroy the socket. Safe when already disconnected.
    ///
    /// With `linger`, waits that long first so in-flight bytes can drain.
    /// Returns false only when destroying the socket failed; the status is
    /// `None` either way.
    pub async fn disconnect(&self, linger: Option<Duration>) -> bool {
        if let Some(delay) = linger {
            debug!(linger_ms = delay.as_millis() as u64, "Lingering before disconnect");
            tokio::time::sleep(delay).await;
        }

        let mut link = self.inner.link.lock().await;
        match link.session.take() {
            Some(session) => {
                self.inner
                    .close_session(&mut link, session, TeardownReason::Disconnect)
                    .await
            }
            None => {
                debug!("Disconnect while not connected");
                true
            }
        }
    }

    /// Print `payload` and report whether the printer signalled completion.
    ///
    /// False without writing anything when not connected. Concurrent calls
    /// are queued and resolved one after another.
    pub async fn send(&self, payload: &[u8]) -> bool {
        let _turn = self.inner.send_queue.lock().await;

        let (id, endpoint, writer, cancel) = {
            let link = self.inner.link.lock().await;
            match &link.session {
                Some(s) => (s.id, s.endpoint.clone(), Arc::clone(&s.writer), s.cancel.clone()),
                None => {
                    debug!(bytes = payload.len(), "Send while not connected");
                    return false;
                }
            }
        };

        let arbiter = CompletionArbiter::new(self.inner.settings.completion_timeout);
        let written = {
            let mut writer = writer.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(DomainError::NotConnected),
                written = arbiter.write_job(&mut *writer, payload, &self.inner.printer_state) => written,
            }
        };

        let states = match written {
            Ok(states) => states,
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Print job write failed");
                self.inner
                    .teardown(id, TeardownReason::WriteFailed(e.to_string()))
                    .await;
                return false;
            }
        };

        let verdict = arbiter.await_verdict(states).await;
        info!(endpoint = %endpoint, bytes = payload.len(), finished = verdict, "Print job resolved");
        verdict
    }

    fn spawn_router(
        &self,
        id: u64,
        router: SocketEventRouter<OwnedReadHalf>,
        cancel: CancellationToken,
    ) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match router.run(cancel).await {
                RouterExit::Closed => inner.teardown(id, TeardownReason::RemoteClosed).await,
                RouterExit::Failed(e) => inner.teardown(id, TeardownReason::SocketError(e)).await,
                RouterExit::Cancelled => true,
            };
        });
    }

    fn spawn_liveness(&self, id: u64, params: &ConnectionParameters, cancel: CancellationToken) {
        let settings = &self.inner.settings;
        let (tx, mut rx) = mpsc::channel(LIVENESS_BUFFER);
        LivenessProber::new(
            Arc::clone(&self.inner.probe),
            params.address.clone(),
            settings.liveness_port.unwrap_or(params.port),
            settings.liveness_interval,
            settings.liveness_timeout,
        )
        .spawn(cancel.clone(), tx);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            loop {
                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    outcome = rx.recv() => match outcome {
                        Some(outcome) => outcome,
                        None => break,
                    },
                };

                let lost = match &outcome.result {
                    ProbeResult::Reachable { .. } => None,
                    ProbeResult::Unreachable { reason } => Some(reason.clone()),
                };
                if cancel.is_cancelled() {
                    break;
                }
                inner.liveness.publish(outcome);

                if let Some(reason) = lost {
                    warn!(session = id, reason = %reason, "Printer stopped answering liveness probes");
                    inner.teardown(id, TeardownReason::LivenessLost(reason)).await;
                    break;
                }
            }
        });
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        // Background tasks hold the inner state; stop them so the socket
        // is released with the last of them
        self.inner.shutdown.cancel();
    }
}

impl Inner {
    /// End session `id` if it is still the live one
    async fn teardown(&self, id: u64, reason: TeardownReason) -> bool {
        let mut link = self.link.lock().await;
        let session = match link.session.take() {
            Some(session) if session.id == id => session,
            other => {
                link.session = other;
                debug!(session = id, reason = %reason, "Session already replaced");
                return true;
            }
        };
        self.close_session(&mut link, session, reason).await
    }

    async fn close_session(&self, link: &mut Link, session: Session, reason: TeardownReason) -> bool {
        session.cancel.cancel();

        let shutdown = session.writer.lock().await.shutdown().await;
        link.status = link.status.to_none();
        self.status_channel.publish(link.status);

        match shutdown {
            Ok(()) => {
                info!(endpoint = %session.endpoint, session = session.id, reason = %reason, "Printer link closed");
                true
            }
            // Peer already gone; nothing left to destroy
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => {
                info!(endpoint = %session.endpoint, session = session.id, reason = %reason, "Printer link closed");
                true
            }
            Err(e) => {
                warn!(endpoint = %session.endpoint, session = session.id, reason = %reason, error = %e, "Printer link closed uncleanly");
                false
            }
        }
    }
}
