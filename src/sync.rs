//! Debounced, fire-and-forget persistence for the board.
//!
//! The synchronizer watches the store's revision counter. Each mutation
//! pokes a debounce window; when the window closes, the minimal projection
//! is serialized and pushed to the persistence endpoint on a spawned task,
//! never blocking the UI. Completed operations report back over an mpsc
//! channel drained from the frame loop. Failed writes are logged and not
//! retried; the in-memory store is always authoritative and only the
//! network copy lags.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use crate::graph::GraphStore;
use crate::types::{Item, PersistedGraph};

/// Errors surfaced by the external item source and persistence endpoint.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The remote side could not be reached or answered with a failure.
    #[error("endpoint unavailable: {0}")]
    Unavailable(String),
    /// The remote side answered with a document we could not parse.
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Read access to the external item source.
pub trait ItemSource: Send + Sync {
    /// Fetches the authoritative ordered item list for the workspace.
    fn fetch_items(&self) -> Result<Vec<Item>, SyncError>;
}

/// The external persistence endpoint for the serialized board document.
pub trait GraphEndpoint: Send + Sync {
    /// Fetches the stored document, or an empty one if none exists yet.
    fn load(&self) -> Result<PersistedGraph, SyncError>;
    /// Pushes a document. Only success/failure matters to the caller.
    fn store(&self, document: &PersistedGraph) -> Result<(), SyncError>;
}

/// A plain debounce primitive over event-loop timestamps (seconds).
///
/// Each poke restarts the quiet period; the action becomes ready once the
/// period elapses with no further pokes. Timestamps are injected so the
/// debouncer is independent of any UI framework and trivially testable.
#[derive(Debug)]
pub struct Debouncer {
    delay: f64,
    deadline: Option<f64>,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet period in seconds.
    pub fn new(delay: f64) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Registers a trigger at `now`, restarting the quiet period.
    pub fn poke(&mut self, now: f64) {
        self.deadline = Some(now + self.delay);
    }

    /// True while a trigger is waiting for its quiet period to elapse.
    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consumes the pending trigger if its quiet period has elapsed.
    pub fn take_ready(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drops any pending trigger without firing.
    pub fn clear(&mut self) {
        self.deadline = None;
    }
}

/// Messages sent from spawned persistence tasks back to the frame loop.
#[derive(Debug)]
enum SyncEvent {
    /// Initial load finished: fresh item list plus the stored document
    Loaded {
        items: Vec<Item>,
        document: PersistedGraph,
    },
    /// Initial load failed
    LoadFailed(String),
    /// A debounced write landed
    Saved,
    /// A debounced write failed; it will not be retried
    SaveFailed(String),
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_task(task: impl FnOnce() + Send + 'static) {
    tokio::spawn(async move { task() });
}

#[cfg(target_arch = "wasm32")]
fn spawn_task(task: impl FnOnce() + 'static) {
    wasm_bindgen_futures::spawn_local(async move { task() });
}

/// Observes store mutations and mirrors them to the persistence endpoint.
pub struct PersistenceSync {
    items: Arc<dyn ItemSource>,
    endpoint: Arc<dyn GraphEndpoint>,
    debounce: Debouncer,
    last_seen_revision: u64,
    pending_writes: usize,
    loaded: bool,
    sender: Sender<SyncEvent>,
    receiver: Receiver<SyncEvent>,
}

impl PersistenceSync {
    /// Creates a synchronizer over the two external contracts.
    pub fn new(items: Arc<dyn ItemSource>, endpoint: Arc<dyn GraphEndpoint>) -> Self {
        let (sender, receiver) = channel();
        Self {
            items,
            endpoint,
            debounce: Debouncer::new(crate::constants::PERSIST_DEBOUNCE_SECS),
            last_seen_revision: 0,
            pending_writes: 0,
            loaded: false,
            sender,
            receiver,
        }
    }

    /// True once the initial load round-trip has completed (successfully or
    /// not); the board is usable either way.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// True while a mutation has not yet landed at the endpoint: either the
    /// debounce window is open or a write is in flight. Drives the
    /// unsaved-changes indicator and the wasm `beforeunload` guard.
    pub fn has_unsynced_changes(&self) -> bool {
        self.debounce.pending() || self.pending_writes > 0
    }

    /// Kicks off the initial fetch of items and the stored document on a
    /// spawned task. `repaint` is invoked when the result is ready so the
    /// frame loop wakes up and drains it.
    pub fn begin_load(&mut self, repaint: impl Fn() + Send + 'static) {
        let items = Arc::clone(&self.items);
        let endpoint = Arc::clone(&self.endpoint);
        let sender = self.sender.clone();
        spawn_task(move || {
            let event = match items.fetch_items() {
                Ok(items) => match endpoint.load() {
                    Ok(document) => SyncEvent::Loaded { items, document },
                    Err(err) => SyncEvent::LoadFailed(err.to_string()),
                },
                Err(err) => SyncEvent::LoadFailed(err.to_string()),
            };
            let _ = sender.send(event);
            repaint();
        });
    }

    /// Per-frame driver: notices new store revisions, restarts the debounce
    /// window for each, and fires the collapsed write once the window
    /// closes. `now` is the event-loop clock in seconds.
    pub fn tick(&mut self, store: &GraphStore, now: f64, repaint: impl Fn() + Send + 'static) {
        if store.revision() != self.last_seen_revision {
            self.last_seen_revision = store.revision();
            self.debounce.poke(now);
        }

        if self.debounce.take_ready(now) {
            self.push(store.to_persisted(), repaint);
        }
    }

    /// Fire-and-forget write of the given document.
    fn push(&mut self, document: PersistedGraph, repaint: impl Fn() + Send + 'static) {
        self.pending_writes += 1;
        let endpoint = Arc::clone(&self.endpoint);
        let sender = self.sender.clone();
        spawn_task(move || {
            let event = match endpoint.store(&document) {
                Ok(()) => SyncEvent::Saved,
                Err(err) => SyncEvent::SaveFailed(err.to_string()),
            };
            let _ = sender.send(event);
            repaint();
        });
    }

    /// Drains completed operations into the store.
    ///
    /// # Returns
    ///
    /// `true` if the board changed and should be repainted.
    pub fn pump(&mut self, store: &mut GraphStore) -> bool {
        let mut changed = false;
        while let Ok(event) = self.receiver.try_recv() {
            match event {
                SyncEvent::Loaded { items, document } => {
                    store.replace_registry(items);
                    store.hydrate(document);
                    // The rehydration itself is not an edit; don't push it
                    // straight back to the endpoint.
                    self.last_seen_revision = store.revision();
                    self.debounce.clear();
                    self.loaded = true;
                    changed = true;
                    log::debug!(
                        "board loaded: {} nodes, {} edges, {} staged items",
                        store.nodes().len(),
                        store.edges().len(),
                        store.toolkit().len()
                    );
                }
                SyncEvent::LoadFailed(err) => {
                    self.loaded = true;
                    log::warn!("initial load failed: {err}");
                }
                SyncEvent::Saved => {
                    self.pending_writes = self.pending_writes.saturating_sub(1);
                    log::debug!("board document persisted");
                }
                SyncEvent::SaveFailed(err) => {
                    self.pending_writes = self.pending_writes.saturating_sub(1);
                    log::warn!("persisting board document failed (not retried): {err}");
                }
            }
        }
        changed
    }
}
