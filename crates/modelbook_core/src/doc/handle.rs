//! Live, versioned handle on one notebook document.
//!
//! # Responsibility
//! - Publish immutable snapshots of the document, one per accepted change.
//! - Provide the single atomic "apply this transformation" entry point for
//!   local edits and the equivalent entry points for merged remote edits.
//! - Notify subscribers of every published snapshot.
//!
//! # Invariants
//! - Snapshots are never mutated after publication; a change clones the
//!   latest snapshot, transforms the clone, and publishes it.
//! - `version` increases by one per published snapshot. Changes that leave
//!   the document equal publish nothing.
//! - Listeners run after the state lock is released, so they may read the
//!   handle or issue further changes.

use crate::model::document::NotebookModel;
use crate::model::ids::DocumentId;
use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Where a published change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Issued by this editing session.
    Local,
    /// Merged in from a collaborator by the document engine.
    Remote,
}

impl Display for ChangeOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// Snapshot of a document at one observation point.
#[derive(Debug, Clone)]
pub struct DocSnapshot {
    pub version: u64,
    pub model: Arc<NotebookModel>,
}

/// Published change: the snapshot before and after.
#[derive(Debug, Clone)]
pub struct DocEvent {
    pub doc_id: DocumentId,
    pub version: u64,
    pub origin: ChangeOrigin,
    pub previous: Arc<NotebookModel>,
    pub current: Arc<NotebookModel>,
}

impl DocEvent {
    /// Whether the cell sequence differs between the two snapshots.
    pub fn notebook_changed(&self) -> bool {
        self.previous.notebook != self.current.notebook
    }

    pub fn theory_changed(&self) -> bool {
        self.previous.theory != self.current.theory
    }
}

type Listener = Arc<dyn Fn(&DocEvent) + Send + Sync>;

struct DocState {
    version: u64,
    model: Arc<NotebookModel>,
}

struct DocShared {
    id: DocumentId,
    state: RwLock<DocState>,
    listeners: Mutex<BTreeMap<u64, Listener>>,
    next_listener: AtomicU64,
}

/// Cheaply cloneable handle; clones share one document.
#[derive(Clone)]
pub struct DocHandle {
    shared: Arc<DocShared>,
}

impl std::fmt::Debug for DocHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocHandle")
            .field("id", &self.shared.id)
            .field("version", &self.version())
            .finish()
    }
}

impl DocHandle {
    /// Wraps an initial document value at version 0.
    pub fn new(id: DocumentId, init: NotebookModel) -> Self {
        Self::with_version(id, init, 0)
    }

    /// Wraps a document value loaded at a known version.
    pub fn with_version(id: DocumentId, init: NotebookModel, version: u64) -> Self {
        Self {
            shared: Arc::new(DocShared {
                id,
                state: RwLock::new(DocState {
                    version,
                    model: Arc::new(init),
                }),
                listeners: Mutex::new(BTreeMap::new()),
                next_listener: AtomicU64::new(0),
            }),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.shared.id
    }

    pub fn version(&self) -> u64 {
        self.shared.state.read().version
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> DocSnapshot {
        let state = self.shared.state.read();
        DocSnapshot {
            version: state.version,
            model: Arc::clone(&state.model),
        }
    }

    pub fn model(&self) -> Arc<NotebookModel> {
        Arc::clone(&self.shared.state.read().model)
    }

    /// Applies a local change atomically. Returns the resulting version.
    pub fn change(&self, f: impl FnOnce(&mut NotebookModel)) -> u64 {
        self.commit(ChangeOrigin::Local, f)
    }

    /// Applies an edit merged from a collaborator on top of the latest
    /// snapshot. Returns the resulting version.
    pub fn merge_remote(&self, f: impl FnOnce(&mut NotebookModel)) -> u64 {
        self.commit(ChangeOrigin::Remote, f)
    }

    /// Replaces the whole document with a merged remote state.
    pub fn replace_remote(&self, model: NotebookModel) -> u64 {
        self.commit(ChangeOrigin::Remote, move |current| *current = model)
    }

    /// Registers a listener for published changes. Dropping the returned
    /// `Subscription` unregisters it.
    pub fn subscribe(&self, listener: impl Fn(&DocEvent) + Send + Sync + 'static) -> Subscription {
        let id = self.shared.next_listener.fetch_add(1, Ordering::Relaxed);
        self.shared.listeners.lock().insert(id, Arc::new(listener));
        Subscription {
            shared: Arc::downgrade(&self.shared),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.shared.listeners.lock().len()
    }

    fn commit(&self, origin: ChangeOrigin, f: impl FnOnce(&mut NotebookModel)) -> u64 {
        let event = {
            let mut state = self.shared.state.write();
            let previous = Arc::clone(&state.model);
            let mut next = NotebookModel::clone(&previous);
            f(&mut next);
            if next == *previous {
                debug!(
                    "event=doc_change module=doc status=skip reason=no_op doc_id={} origin={}",
                    self.shared.id, origin
                );
                return state.version;
            }
            state.version += 1;
            state.model = Arc::new(next);
            DocEvent {
                doc_id: self.shared.id,
                version: state.version,
                origin,
                previous,
                current: Arc::clone(&state.model),
            }
        };

        info!(
            "event=doc_change module=doc status=ok doc_id={} version={} origin={} cells={}",
            event.doc_id,
            event.version,
            event.origin,
            event.current.notebook.len()
        );

        let listeners: Vec<Listener> = self.shared.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener(&event);
        }
        event.version
    }
}

/// Keeps a listener registered while alive.
pub struct Subscription {
    shared: Weak<DocShared>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.listeners.lock().remove(&self.id);
        }
    }
}
