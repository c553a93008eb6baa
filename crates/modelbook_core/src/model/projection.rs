//! Object name index derived from the live document.
//!
//! # Responsibility
//! - Build the object id to name index from a notebook's formal cells.
//! - Keep one shared index current for a `DocHandle`, recomputing it only
//!   when the cell sequence changes.
//!
//! # Invariants
//! - After a change to the cell sequence is published, the next read sees an
//!   index built from that snapshot.
//! - An event older than the stored index is ignored, so out-of-order
//!   notifications never regress the index.
//! - Readers get an `Arc` and never observe a partially built index.

use crate::doc::handle::{DocEvent, DocHandle, Subscription};
use crate::model::context::ObjectNameMap;
use crate::model::document::ModelNotebook;
use crate::model::judgment::ModelJudgment;
use arc_swap::ArcSwap;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Object declarations of `notebook`, in notebook order, keyed by id.
pub fn object_name_map(notebook: &ModelNotebook) -> ObjectNameMap {
    notebook
        .formal_contents()
        .filter_map(ModelJudgment::as_object)
        .map(|object| (object.id, object.name.clone()))
        .collect()
}

#[derive(Debug)]
struct NameIndexSnapshot {
    version: u64,
    names: Arc<ObjectNameMap>,
}

#[derive(Debug, Default)]
struct Counters {
    rebuilds: AtomicU64,
}

/// Name index kept current for one document.
pub struct NameIndexProjection {
    current: Arc<ArcSwap<NameIndexSnapshot>>,
    counters: Arc<Counters>,
    _subscription: Subscription,
}

impl NameIndexProjection {
    pub fn attach(handle: &DocHandle) -> Self {
        let snapshot = handle.snapshot();
        let counters = Arc::new(Counters::default());
        let current = Arc::new(ArcSwap::from_pointee(NameIndexSnapshot {
            version: snapshot.version,
            names: Arc::new(object_name_map(&snapshot.model.notebook)),
        }));
        counters.rebuilds.fetch_add(1, Ordering::Relaxed);

        let target = Arc::clone(&current);
        let rebuilds = Arc::clone(&counters);
        let subscription = handle.subscribe(move |event| apply_event(&target, &rebuilds, event));

        // A change published between the snapshot and the subscription.
        let latest = handle.snapshot();
        if latest.version > snapshot.version {
            store_if_newer(
                &current,
                NameIndexSnapshot {
                    version: latest.version,
                    names: Arc::new(object_name_map(&latest.model.notebook)),
                },
            );
            counters.rebuilds.fetch_add(1, Ordering::Relaxed);
        }

        Self {
            current,
            counters,
            _subscription: subscription,
        }
    }

    /// Current index.
    pub fn names(&self) -> Arc<ObjectNameMap> {
        Arc::clone(&self.current.load().names)
    }

    /// Document version the index reflects.
    pub fn version(&self) -> u64 {
        self.current.load().version
    }

    /// How many times the index has been built, including the initial build.
    pub fn rebuild_count(&self) -> u64 {
        self.counters.rebuilds.load(Ordering::Relaxed)
    }
}

fn apply_event(target: &ArcSwap<NameIndexSnapshot>, counters: &Counters, event: &DocEvent) {
    let current = target.load_full();
    if event.version <= current.version {
        debug!(
            "event=name_index module=model status=skip reason=stale_event doc_id={} version={}",
            event.doc_id, event.version
        );
        return;
    }

    // Reusing the index is only sound when it reflects the previous version.
    let names = if event.notebook_changed() || current.version + 1 != event.version {
        counters.rebuilds.fetch_add(1, Ordering::Relaxed);
        let names = Arc::new(object_name_map(&event.current.notebook));
        debug!(
            "event=name_index module=model status=ok doc_id={} version={} objects={}",
            event.doc_id,
            event.version,
            names.len()
        );
        names
    } else {
        Arc::clone(&current.names)
    };

    store_if_newer(
        target,
        NameIndexSnapshot {
            version: event.version,
            names,
        },
    );
}

fn store_if_newer(target: &ArcSwap<NameIndexSnapshot>, next: NameIndexSnapshot) {
    let next = Arc::new(next);
    target.rcu(|current| {
        if current.version >= next.version {
            Arc::clone(current)
        } else {
            Arc::clone(&next)
        }
    });
}
