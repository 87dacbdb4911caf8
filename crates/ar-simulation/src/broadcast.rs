//! Fan-out of outbound messages to connected observers.
//!
//! Each observer owns a bounded queue drained by its own sender task, so a
//! slow or dead connection never blocks the tick or other observers.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::message::ServerMessage;

/// The single outward operation the core calls.
pub trait Broadcaster: Send + Sync {
    /// Queue `message` for every subscribed observer. Never blocks.
    fn broadcast(&self, message: ServerMessage);
}

/// A receiving end handed to one observer.
#[derive(Debug)]
pub struct Subscription {
    /// Handle for [`BroadcastHub::unsubscribe`].
    pub id: u64,
    /// Messages addressed to this observer.
    pub receiver: mpsc::Receiver<Arc<ServerMessage>>,
}

type Senders = HashMap<u64, mpsc::Sender<Arc<ServerMessage>>>;

/// Broadcaster backed by one bounded `mpsc` queue per observer.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    senders: Arc<Mutex<Senders>>,
    next_id: Arc<AtomicU64>,
    capacity: usize,
}

impl BroadcastHub {
    /// A hub whose per-observer queues hold `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            senders: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            capacity: capacity.max(1),
        }
    }

    fn senders(&self) -> MutexGuard<'_, Senders> {
        self.senders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new observer.
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.capacity);
        self.senders().insert(id, tx);
        debug!(subscriber = id, "observer subscribed");
        Subscription { id, receiver: rx }
    }

    /// Drop an observer. Returns `false` if the id was unknown.
    pub fn unsubscribe(&self, id: u64) -> bool {
        self.senders().remove(&id).is_some()
    }

    /// Number of registered observers.
    pub fn subscriber_count(&self) -> usize {
        self.senders().len()
    }
}

impl Broadcaster for BroadcastHub {
    fn broadcast(&self, message: ServerMessage) {
        let message = Arc::new(message);
        let mut senders = self.senders();
        senders.retain(|&id, tx| match tx.try_send(Arc::clone(&message)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(subscriber = id, kind = message.kind(), "observer queue full, dropping message");
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!(subscriber = id, "observer gone, removing");
                false
            }
        });
    }
}

/// Drain `subscription` into `send` until the observer or the hub goes
/// away. `send` returns `false` when the connection has failed.
pub fn spawn_sender<F, Fut>(mut subscription: Subscription, mut send: F) -> JoinHandle<()>
where
    F: FnMut(Arc<ServerMessage>) -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(message) = subscription.receiver.recv().await {
            if !send(message).await {
                debug!(subscriber = subscription.id, "send failed, closing observer");
                break;
            }
        }
    })
}
