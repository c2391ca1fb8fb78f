//! Observer registry - fan-out of controller status lines to dashboards
//!
//! Each live dashboard connection registers an unbounded channel here. The
//! reader loop broadcasts every inbound controller line; a channel whose send
//! fails (client gone) is pruned after the fan-out pass, so membership is
//! self-healing. Delivery is best-effort: nothing is retried or buffered for
//! disconnected observers.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Marker line queued to a freshly registered observer only
pub const CONNECT_ACK: &str = "WS_CONNECTED";

/// Handle identifying one registered observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Default)]
struct Inner {
    next_id: u64,
    channels: HashMap<ObserverId, mpsc::UnboundedSender<String>>,
}

/// Dynamic set of live dashboard channels
#[derive(Default)]
pub struct ObserverRegistry {
    inner: Mutex<Inner>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new observer and hand back its id plus the receiving end.
    /// The connection-acknowledged marker is queued to this channel only.
    pub fn register(&self) -> (ObserverId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(CONNECT_ACK.to_string());

        let mut inner = self.inner.lock();
        let id = ObserverId(inner.next_id);
        inner.next_id += 1;
        inner.channels.insert(id, tx);
        debug!(observer = id.0, total = inner.channels.len(), "Observer registered");
        (id, rx)
    }

    /// Remove an observer; idempotent.
    pub fn unregister(&self, id: ObserverId) {
        let mut inner = self.inner.lock();
        if inner.channels.remove(&id).is_some() {
            debug!(observer = id.0, total = inner.channels.len(), "Observer unregistered");
        }
    }

    /// Send `line` to every registered observer. Channels whose send fails
    /// are collected during the pass and removed afterwards, never mid-
    /// iteration. Returns the number of successful deliveries.
    pub fn broadcast(&self, line: &str) -> usize {
        let mut inner = self.inner.lock();
        let mut dead = Vec::new();
        let mut delivered = 0;

        for (id, tx) in &inner.channels {
            if tx.send(line.to_string()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*id);
            }
        }
        for id in dead {
            inner.channels.remove(&id);
            debug!(observer = id.0, "Pruned dead observer");
        }

        trace!(delivered, "Broadcast status line");
        delivered
    }

    pub fn len(&self) -> usize {
        self.inner.lock().channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
