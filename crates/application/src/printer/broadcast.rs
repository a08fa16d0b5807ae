use std::fmt::Debug;

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::trace;

/// Buffered values per subscriber before it starts lagging
const DEFAULT_CAPACITY: usize = 64;

/// Multi-subscriber notification channel.
///
/// Subscribers only see values published after they subscribed; there is no
/// replay. A subscriber that falls more than the channel capacity behind
/// skips the oldest values.
#[derive(Clone)]
pub struct Broadcast<T> {
    name: &'static str,
    tx: broadcast::Sender<T>,
}

impl<T> Broadcast<T>
where
    T: Clone + Debug + Send + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self::with_capacity(name, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(name: &'static str, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { name, tx }
    }

    /// Push `value` to every current subscriber. Returns how many received it.
    pub fn publish(&self, value: T) -> usize {
        trace!(channel = self.name, value = ?value, "Publishing");
        // No subscribers is not an error
        self.tx.send(value).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.tx.subscribe()
    }

    /// Subscription as a stream; lagged gaps are skipped silently
    pub fn stream(&self) -> impl Stream<Item = T> + Send + Unpin + use<T> {
        BroadcastStream::new(self.tx.subscribe()).filter_map(|item| item.ok())
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
