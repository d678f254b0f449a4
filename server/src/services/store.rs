use std::sync::Arc;

use tokio::sync::{mpsc, watch, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ports::EventBackend;
use crate::models::Event;

/// In-memory copy of the backend's event list.
///
/// A failed refresh keeps whatever was loaded before. Every successful refresh
/// bumps the generation counter, which observers can watch.
pub struct EventStore {
    backend: Arc<dyn EventBackend>,
    events: RwLock<Arc<Vec<Event>>>,
    generation: watch::Sender<u64>,
}

impl EventStore {
    pub fn new(backend: Arc<dyn EventBackend>) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            backend,
            events: RwLock::new(Arc::new(Vec::new())),
            generation,
        }
    }

    /// Returns whether the list was replaced.
    pub async fn refresh(&self) -> bool {
        match self.backend.fetch_events().await {
            Ok(events) => {
                let count = events.len();
                *self.events.write().await = Arc::new(events);
                let mut generation = 0;
                self.generation.send_modify(|g| {
                    *g += 1;
                    generation = *g;
                });
                info!(count, generation, "Event list refreshed");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch events, keeping previous list");
                false
            }
        }
    }

    pub async fn snapshot(&self) -> Arc<Vec<Event>> {
        self.events.read().await.clone()
    }

    pub async fn find(&self, id: Uuid) -> Option<Event> {
        self.events.read().await.iter().find(|e| e.id == id).cloned()
    }

    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }
}

/// Sending half of the "events changed" channel. Cheap to clone.
#[derive(Clone)]
pub struct ChangeNotifier {
    tx: mpsc::UnboundedSender<()>,
}

impl ChangeNotifier {
    pub fn notify(&self) {
        if self.tx.send(()).is_err() {
            debug!("No change listener running, skipping refresh request");
        }
    }
}

pub struct ChangeListener {
    rx: mpsc::UnboundedReceiver<()>,
}

impl ChangeListener {
    /// Waits for the next notification, collapsing any that queued up meanwhile.
    /// `None` once every notifier is gone.
    pub async fn changed(&mut self) -> Option<()> {
        self.rx.recv().await?;
        while self.rx.try_recv().is_ok() {}
        Some(())
    }
}

pub fn change_channel() -> (ChangeNotifier, ChangeListener) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChangeNotifier { tx }, ChangeListener { rx })
}
